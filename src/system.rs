//! The energy system aggregate and its external interface.

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::SystemConfig;
use crate::controller::{Admission, LoadController, SheddingReport};
use crate::device::Device;
use crate::error::SystemError;
use crate::history::{HistoryRecord, HistoryTracker};
use crate::registry::DeviceRegistry;
use crate::report::SystemReport;
use crate::scheduler::{ScheduledTask, TaskScheduler};

/// Result of toggling a device.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// Device turned on; the new load fit within capacity.
    ActivatedDirectly,
    /// Device turned on after shedding lower-priority devices.
    ActivatedAfterShedding(SheddingReport),
    /// Critical device refused: shedding could not free enough capacity.
    RejectedInsufficientCapacity(SheddingReport),
    /// Non-critical device refused: activation would exceed capacity.
    RejectedWouldExceedCapacity {
        current_w: f32,
        requested_w: f32,
        capacity_w: f32,
    },
    /// Device turned off; usage for the interval was recorded.
    Deactivated(HistoryRecord),
}

/// Explicitly constructed aggregate of registry, scheduler, history, and
/// capacity configuration.
///
/// Generic over `C: Clock` for static dispatch; production code uses
/// [`SystemClock`], tests a manual clock. Every operation takes `&mut self`
/// and runs to completion, so an admission and its shedding pass can never
/// interleave with another toggle.
pub struct EnergySystem<C: Clock = SystemClock> {
    config: SystemConfig,
    registry: DeviceRegistry,
    scheduler: TaskScheduler,
    history: HistoryTracker,
    controller: LoadController,
    clock: C,
}

impl EnergySystem<SystemClock> {
    /// Creates a system driven by the wall clock.
    pub fn new(config: SystemConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> EnergySystem<C> {
    /// Creates a system with an explicit time source.
    pub fn with_clock(config: SystemConfig, clock: C) -> Self {
        let controller = LoadController::new(config.max_load_capacity_w);
        Self {
            config,
            registry: DeviceRegistry::new(),
            scheduler: TaskScheduler::new(),
            history: HistoryTracker::new(),
            controller,
            clock,
        }
    }

    /// Registers a new device, initially off.
    ///
    /// Critical devices are forced to the maximum priority regardless of the
    /// requested value.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if the id is already registered.
    pub fn register(
        &mut self,
        id: &str,
        name: &str,
        consumption_w: f32,
        is_critical: bool,
        requested_priority: u8,
    ) -> Result<&Device, SystemError> {
        let device = Device::new(id, name, consumption_w, is_critical, requested_priority);
        let priority = device.priority();
        self.registry.insert(device)?;
        debug!(device_id = id, consumption_w, is_critical, priority, "device registered");
        self.registry.get(id)
    }

    /// Looks up a device by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn device(&self, id: &str) -> Result<&Device, SystemError> {
        self.registry.get(id)
    }

    /// Iterates all registered devices in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.devices()
    }

    /// Iterates the devices protected from automatic shedding.
    pub fn critical_devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.devices().filter(|d| d.is_critical())
    }

    /// Toggles a device: admission-checked activation when off,
    /// unconditional deactivation (with usage recording) when on.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Result<ToggleOutcome, SystemError> {
        if self.registry.get(id)?.is_on() {
            let now = self.clock.now();
            let record = self.registry.get_mut(id)?.turn_off(now)?;
            info!(
                device_id = id,
                duration_seconds = record.duration_seconds,
                units_kwh = record.units_kwh,
                "device deactivated"
            );
            self.history.push(record.clone());
            return Ok(ToggleOutcome::Deactivated(record));
        }

        let admission =
            self.controller
                .admit(id, &mut self.registry, &mut self.history, &self.clock)?;
        Ok(match admission {
            Admission::Granted => ToggleOutcome::ActivatedDirectly,
            Admission::GrantedAfterShedding(report) => {
                ToggleOutcome::ActivatedAfterShedding(report)
            }
            Admission::DeniedInsufficientCapacity(report) => {
                ToggleOutcome::RejectedInsufficientCapacity(report)
            }
            Admission::DeniedWouldExceedCapacity {
                current_w,
                requested_w,
                capacity_w,
            } => ToggleOutcome::RejectedWouldExceedCapacity {
                current_w,
                requested_w,
                capacity_w,
            },
        })
    }

    /// Queues a future activation for the device and returns the task,
    /// priced at the tariff for the scheduled hour.
    ///
    /// Scheduling is independent of the device's current activation state;
    /// the scheduler only orders tasks and never fires them.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidHour` outside 0-23,
    /// `InvalidDuration` for zero minutes.
    pub fn schedule(
        &mut self,
        id: &str,
        scheduled_hour: u8,
        duration_minutes: u32,
    ) -> Result<ScheduledTask, SystemError> {
        if scheduled_hour > 23 {
            return Err(SystemError::InvalidHour {
                hour: scheduled_hour,
            });
        }
        if duration_minutes == 0 {
            return Err(SystemError::InvalidDuration);
        }
        let device = self.registry.get(id)?;
        let tariff = self.config.tariff_for_hour(scheduled_hour);
        let task = ScheduledTask::new(device, scheduled_hour, duration_minutes, tariff);
        debug!(
            device_id = id,
            scheduled_hour,
            duration_minutes,
            priority = task.priority,
            estimated_cost = task.estimated_cost,
            "task scheduled"
        );
        self.scheduler.enqueue(task.clone());
        Ok(task)
    }

    /// Returns the top-ranked pending task without removing it.
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if nothing is scheduled.
    pub fn peek_next_task(&self) -> Result<&ScheduledTask, SystemError> {
        self.scheduler.peek()
    }

    /// Removes and returns the top-ranked pending task.
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if nothing is scheduled.
    pub fn dequeue_next_task(&mut self) -> Result<ScheduledTask, SystemError> {
        self.scheduler.dequeue()
    }

    /// Pending tasks in heap storage order (only the first is guaranteed
    /// top-ranked); callers may re-sort for display.
    pub fn pending_tasks(&self) -> &[ScheduledTask] {
        self.scheduler.as_slice()
    }

    /// Sum of consumption rates over all active devices (watts).
    pub fn total_active_load(&self) -> f32 {
        self.controller.current_total_load(&self.registry)
    }

    /// The usage history log.
    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// The system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// The system's time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Computes the aggregate consumption report.
    pub fn report(&self) -> SystemReport {
        SystemReport::compute(&self.registry, &self.history, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn system(capacity_w: f32) -> EnergySystem<ManualClock> {
        let config = SystemConfig {
            max_load_capacity_w: capacity_w,
            ..SystemConfig::default()
        };
        EnergySystem::with_clock(config, ManualClock::default())
    }

    #[test]
    fn register_forces_critical_priority() {
        let mut sys = system(1000.0);
        let device = sys.register("d1", "Fridge", 150.0, true, 3).unwrap();
        assert_eq!(device.priority(), 10);
    }

    #[test]
    fn register_rejects_duplicate_id() {
        let mut sys = system(1000.0);
        sys.register("d1", "Lamp", 40.0, false, 5).unwrap();
        assert!(matches!(
            sys.register("d1", "Other", 100.0, false, 5),
            Err(SystemError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn toggle_unknown_device_is_not_found() {
        let mut sys = system(1000.0);
        assert!(matches!(
            sys.toggle("ghost"),
            Err(SystemError::NotFound { .. })
        ));
    }

    #[test]
    fn toggle_activates_then_deactivates_with_usage() {
        let mut sys = system(2000.0);
        sys.register("d1", "Heater", 1000.0, false, 5).unwrap();

        assert_eq!(sys.toggle("d1").unwrap(), ToggleOutcome::ActivatedDirectly);
        assert_eq!(sys.total_active_load(), 1000.0);

        sys.clock().advance_secs(3600);
        match sys.toggle("d1").unwrap() {
            ToggleOutcome::Deactivated(record) => {
                assert_eq!(record.duration_seconds, 3600);
                assert_eq!(record.units_kwh, 1.0);
            }
            other => panic!("expected deactivation, got {other:?}"),
        }
        assert_eq!(sys.total_active_load(), 0.0);
        assert_eq!(sys.history().len(), 1);
    }

    #[test]
    fn schedule_validates_hour_and_duration() {
        let mut sys = system(1000.0);
        sys.register("d1", "Washer", 500.0, false, 5).unwrap();
        assert!(matches!(
            sys.schedule("d1", 24, 30),
            Err(SystemError::InvalidHour { hour: 24 })
        ));
        assert!(matches!(
            sys.schedule("d1", 10, 0),
            Err(SystemError::InvalidDuration)
        ));
        assert!(matches!(
            sys.schedule("ghost", 10, 30),
            Err(SystemError::NotFound { .. })
        ));
    }

    #[test]
    fn schedule_prices_peak_and_off_peak() {
        let mut sys = system(1000.0);
        sys.register("d1", "Washer", 1000.0, false, 5).unwrap();

        // 1000 W for 60 min = 1 kWh
        let peak = sys.schedule("d1", 12, 60).unwrap();
        assert!((peak.estimated_cost - 20.0).abs() < 1e-4);
        assert!(peak.is_peak());

        let off_peak = sys.schedule("d1", 23, 60).unwrap();
        assert!((off_peak.estimated_cost - 10.0).abs() < 1e-4);
        assert!(!off_peak.is_peak());

        assert_eq!(sys.pending_tasks().len(), 2);
    }

    #[test]
    fn manual_turn_off_of_critical_device_is_allowed() {
        let mut sys = system(1000.0);
        sys.register("crit", "Fridge", 150.0, true, 3).unwrap();
        sys.toggle("crit").unwrap();
        sys.clock().advance_secs(60);
        assert!(matches!(
            sys.toggle("crit").unwrap(),
            ToggleOutcome::Deactivated(_)
        ));
    }

    #[test]
    fn critical_listing_filters_registry() {
        let mut sys = system(1000.0);
        sys.register("a", "Lamp", 40.0, false, 5).unwrap();
        sys.register("b", "Fridge", 150.0, true, 3).unwrap();
        sys.register("c", "Router", 10.0, true, 1).unwrap();

        let ids: Vec<&str> = sys.critical_devices().map(Device::id).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
