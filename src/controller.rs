//! Capacity-aware admission and greedy load shedding.

use std::fmt;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::SystemError;
use crate::history::HistoryTracker;
use crate::registry::DeviceRegistry;

/// One device deactivated during a shedding pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShedDevice {
    pub device_id: String,
    pub device_name: String,
    pub priority: u8,
    pub consumption_w: f32,
}

/// Outcome of a shedding pass.
///
/// Shed devices stay off even when the pass falls short of the requirement;
/// there is no rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct SheddingReport {
    /// Capacity the pass needed to free (watts).
    pub required_w: f32,
    /// Capacity actually freed (watts).
    pub freed_w: f32,
    /// Devices deactivated, in shedding order.
    pub shed: Vec<ShedDevice>,
}

impl SheddingReport {
    /// Whether the pass freed at least the required capacity.
    pub fn is_sufficient(&self) -> bool {
        self.freed_w >= self.required_w
    }
}

impl fmt::Display for SheddingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shed {} device(s), freed {:.1} W of {:.1} W required ({})",
            self.shed.len(),
            self.freed_w,
            self.required_w,
            if self.is_sufficient() {
                "sufficient"
            } else {
                "insufficient"
            }
        )
    }
}

/// Admission decision for an off→on request.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// The new load fits within capacity as-is.
    Granted,
    /// Shedding freed enough capacity; the device is now on.
    GrantedAfterShedding(SheddingReport),
    /// Critical device, but shedding could not free enough capacity.
    DeniedInsufficientCapacity(SheddingReport),
    /// Non-critical device would exceed capacity; never triggers shedding.
    DeniedWouldExceedCapacity {
        current_w: f32,
        requested_w: f32,
        capacity_w: f32,
    },
}

/// Stateless admission and shedding algorithms over the registry.
///
/// Holds only the configured capacity; all device state lives in the
/// registry and all accounting in the history tracker.
#[derive(Debug, Clone, Copy)]
pub struct LoadController {
    capacity_w: f32,
}

impl LoadController {
    /// Creates a controller for the given capacity budget (watts).
    pub fn new(capacity_w: f32) -> Self {
        Self { capacity_w }
    }

    /// Configured capacity budget (watts).
    pub fn capacity_w(&self) -> f32 {
        self.capacity_w
    }

    /// Sum of consumption rates over all active devices.
    pub fn current_total_load(&self, registry: &DeviceRegistry) -> f32 {
        registry
            .devices()
            .filter(|d| d.is_on())
            .map(|d| d.consumption_w())
            .sum()
    }

    /// Decides an off→on request for the device, turning it on when granted.
    ///
    /// A load within capacity is granted directly. Over capacity, a critical
    /// device triggers a shedding pass for the shortfall and is granted only
    /// if the pass suffices; a non-critical device is denied outright.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `AlreadyOn` if the device is active.
    pub fn admit(
        &self,
        id: &str,
        registry: &mut DeviceRegistry,
        history: &mut HistoryTracker,
        clock: &impl Clock,
    ) -> Result<Admission, SystemError> {
        let device = registry.get(id)?;
        if device.is_on() {
            return Err(SystemError::AlreadyOn { id: id.to_string() });
        }
        let requested_w = device.consumption_w();
        let is_critical = device.is_critical();

        let current_w = self.current_total_load(registry);
        let new_load_w = current_w + requested_w;

        if new_load_w <= self.capacity_w {
            registry.get_mut(id)?.turn_on(clock.now())?;
            debug!(device_id = id, new_load_w, "admitted within capacity");
            return Ok(Admission::Granted);
        }

        if !is_critical {
            debug!(
                device_id = id,
                current_w, requested_w, "denied, would exceed capacity"
            );
            return Ok(Admission::DeniedWouldExceedCapacity {
                current_w,
                requested_w,
                capacity_w: self.capacity_w,
            });
        }

        let report = self.shed(new_load_w - self.capacity_w, registry, history, clock)?;
        if report.is_sufficient() {
            registry.get_mut(id)?.turn_on(clock.now())?;
            info!(device_id = id, freed_w = report.freed_w, "admitted after shedding");
            Ok(Admission::GrantedAfterShedding(report))
        } else {
            warn!(
                device_id = id,
                freed_w = report.freed_w,
                required_w = report.required_w,
                "shedding fell short, admission denied"
            );
            Ok(Admission::DeniedInsufficientCapacity(report))
        }
    }

    /// Greedily deactivates active non-critical devices, lowest priority
    /// first, until the required capacity is freed or candidates run out.
    ///
    /// Each deactivation is a full on→off transition: a usage record is
    /// appended to the history exactly as for a manual turn-off. Equal
    /// priorities shed in registration order (stable sort).
    ///
    /// # Errors
    ///
    /// Propagates registry lookup failures; these cannot occur for ids
    /// collected from the same registry in the same pass.
    pub fn shed(
        &self,
        required_w: f32,
        registry: &mut DeviceRegistry,
        history: &mut HistoryTracker,
        clock: &impl Clock,
    ) -> Result<SheddingReport, SystemError> {
        let mut candidates: Vec<(String, u8)> = registry
            .devices()
            .filter(|d| d.is_on() && !d.is_critical())
            .map(|d| (d.id().to_string(), d.priority()))
            .collect();
        candidates.sort_by_key(|(_, priority)| *priority);

        let mut freed_w = 0.0;
        let mut shed = Vec::new();
        for (id, priority) in candidates {
            if freed_w >= required_w {
                break;
            }
            let device = registry.get_mut(&id)?;
            let consumption_w = device.consumption_w();
            let device_name = device.name().to_string();
            let record = device.turn_off(clock.now())?;
            history.push(record);
            freed_w += consumption_w;
            info!(device_id = %id, priority, consumption_w, "shed device");
            shed.push(ShedDevice {
                device_id: id,
                device_name,
                priority,
                consumption_w,
            });
        }

        Ok(SheddingReport {
            required_w,
            freed_w,
            shed,
        })
    }
}
