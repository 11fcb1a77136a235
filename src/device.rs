//! Device entity and its on/off state machine.

use chrono::{DateTime, Utc};

use crate::error::SystemError;
use crate::history::HistoryRecord;

/// Lowest assignable priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest priority; critical devices always carry this value.
pub const MAX_PRIORITY: u8 = 10;

/// Activation state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Off,
    On,
}

/// One controllable electrical load.
///
/// Identity, consumption rate, criticality, and priority are fixed at
/// registration; only the activation state changes afterwards. A critical
/// device is exempt from automatic load shedding and is forced to
/// [`MAX_PRIORITY`] regardless of the requested value.
#[derive(Debug, Clone)]
pub struct Device {
    id: String,
    name: String,
    consumption_w: f32,
    is_critical: bool,
    priority: u8,
    status: DeviceStatus,
    activated_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Creates a device in the `Off` state.
    ///
    /// Critical devices get [`MAX_PRIORITY`]; for non-critical devices the
    /// requested priority is clamped into `MIN_PRIORITY..=MAX_PRIORITY`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        consumption_w: f32,
        is_critical: bool,
        requested_priority: u8,
    ) -> Self {
        let priority = if is_critical {
            MAX_PRIORITY
        } else {
            requested_priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
        };
        Self {
            id: id.into(),
            name: name.into(),
            consumption_w,
            is_critical,
            priority,
            status: DeviceStatus::Off,
            activated_at: None,
        }
    }

    /// Unique device identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consumption rate while active (watts).
    pub fn consumption_w(&self) -> f32 {
        self.consumption_w
    }

    /// Whether this device is protected from automatic shedding.
    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    /// Shedding priority; higher survives longer.
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Current activation state.
    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Whether the device is currently drawing power.
    pub fn is_on(&self) -> bool {
        self.status == DeviceStatus::On
    }

    /// Instant the device was last turned on; `Some` only while on.
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    /// Transitions off→on, recording the activation instant.
    ///
    /// # Errors
    ///
    /// `AlreadyOn` if the device is already active.
    pub fn turn_on(&mut self, now: DateTime<Utc>) -> Result<(), SystemError> {
        if self.is_on() {
            return Err(SystemError::AlreadyOn {
                id: self.id.clone(),
            });
        }
        self.status = DeviceStatus::On;
        self.activated_at = Some(now);
        Ok(())
    }

    /// Transitions on→off and yields the usage record for the interval.
    ///
    /// # Errors
    ///
    /// `AlreadyOff` if the device is not active; no record is produced.
    pub fn turn_off(&mut self, now: DateTime<Utc>) -> Result<HistoryRecord, SystemError> {
        let Some(started) = self.activated_at else {
            return Err(SystemError::AlreadyOff {
                id: self.id.clone(),
            });
        };
        let duration_seconds = (now - started).num_seconds().max(0);
        self.status = DeviceStatus::Off;
        self.activated_at = None;
        Ok(HistoryRecord::new(
            self.id.clone(),
            self.name.clone(),
            self.consumption_w,
            now,
            duration_seconds,
        ))
    }
}
