//! Append-only usage history and energy accounting.

use chrono::{DateTime, Utc};

/// One completed usage interval, created on every on→off transition.
///
/// Records are snapshots: the device may later be renamed or re-registered
/// without affecting past accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Id of the device that was running.
    pub device_id: String,
    /// Device name at the time of deactivation.
    pub device_name: String,
    /// Consumption rate while active (watts).
    pub consumption_w: f32,
    /// Instant the device was turned off.
    pub ended_at: DateTime<Utc>,
    /// Seconds the device was active.
    pub duration_seconds: i64,
    /// Energy consumed over the interval (kWh).
    pub units_kwh: f32,
}

impl HistoryRecord {
    /// Builds a record for a usage interval, deriving the energy consumed.
    ///
    /// `units_kwh = consumption_w * duration_seconds / 3600 / 1000`.
    pub fn new(
        device_id: impl Into<String>,
        device_name: impl Into<String>,
        consumption_w: f32,
        ended_at: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Self {
        let units_kwh = consumption_w * duration_seconds as f32 / 3600.0 / 1000.0;
        Self {
            device_id: device_id.into(),
            device_name: device_name.into(),
            consumption_w,
            ended_at,
            duration_seconds,
            units_kwh,
        }
    }
}

/// Insertion-ordered, growable log of usage records.
///
/// Records are never mutated or removed once pushed.
#[derive(Debug, Default, Clone)]
pub struct HistoryTracker {
    records: Vec<HistoryRecord>,
}

impl HistoryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed usage record.
    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Number of records logged so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no usage has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total energy consumed across all records (kWh).
    pub fn total_units_kwh(&self) -> f32 {
        self.records.iter().map(|r| r.units_kwh).sum()
    }

    /// Estimated cost of all recorded usage at a fixed per-unit rate.
    pub fn estimated_cost(&self, cost_per_kwh: f32) -> f32 {
        self.total_units_kwh() * cost_per_kwh
    }
}
