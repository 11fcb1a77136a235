//! Post-hoc aggregate statistics over registry and history.

use std::fmt;

use crate::config::SystemConfig;
use crate::history::HistoryTracker;
use crate::registry::DeviceRegistry;

/// Utilization fraction above which the report flags high load.
const HIGH_LOAD_THRESHOLD: f32 = 0.9;

/// Aggregate consumption figures computed as a single fold over the
/// registry and history log.
///
/// Pure read-only snapshot; rendering beyond the provided `Display` impl is
/// the consumer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemReport {
    /// Total registered devices.
    pub device_count: usize,
    /// Devices currently on.
    pub active_count: usize,
    /// Registered critical devices.
    pub critical_count: usize,
    /// Critical devices currently on.
    pub critical_active_count: usize,
    /// Sum of active consumption rates (watts).
    pub total_load_w: f32,
    /// Active consumption from critical devices (watts).
    pub critical_load_w: f32,
    /// Configured capacity (watts).
    pub capacity_w: f32,
    /// `total_load_w / capacity_w` as a percentage.
    pub utilization_pct: f32,
    /// Capacity still available (watts).
    pub available_w: f32,
    /// Whether utilization exceeds the high-load threshold (90%).
    pub high_load_warning: bool,
    /// Number of usage records logged.
    pub history_count: usize,
    /// Total recorded energy (kWh).
    pub total_units_kwh: f32,
    /// Recorded energy priced at the configured per-unit rate.
    pub estimated_cost: f32,
}

impl SystemReport {
    /// Folds registry, history, and configuration into a report.
    pub fn compute(
        registry: &DeviceRegistry,
        history: &HistoryTracker,
        config: &SystemConfig,
    ) -> Self {
        let mut active_count = 0;
        let mut critical_count = 0;
        let mut critical_active_count = 0;
        let mut total_load_w = 0.0;
        let mut critical_load_w = 0.0;

        for device in registry.devices() {
            if device.is_critical() {
                critical_count += 1;
            }
            if device.is_on() {
                active_count += 1;
                total_load_w += device.consumption_w();
                if device.is_critical() {
                    critical_active_count += 1;
                    critical_load_w += device.consumption_w();
                }
            }
        }

        let capacity_w = config.max_load_capacity_w;
        let utilization_pct = if capacity_w > 0.0 {
            total_load_w / capacity_w * 100.0
        } else {
            0.0
        };
        let total_units_kwh = history.total_units_kwh();

        Self {
            device_count: registry.len(),
            active_count,
            critical_count,
            critical_active_count,
            total_load_w,
            critical_load_w,
            capacity_w,
            utilization_pct,
            available_w: capacity_w - total_load_w,
            high_load_warning: total_load_w > capacity_w * HIGH_LOAD_THRESHOLD,
            history_count: history.len(),
            total_units_kwh,
            estimated_cost: total_units_kwh * config.cost_per_kwh,
        }
    }
}

impl fmt::Display for SystemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Consumption Report ---")?;
        writeln!(
            f,
            "Devices:        {} total, {} active",
            self.device_count, self.active_count
        )?;
        writeln!(
            f,
            "Critical:       {} total, {} active ({:.1} W)",
            self.critical_count, self.critical_active_count, self.critical_load_w
        )?;
        writeln!(
            f,
            "Load:           {:.1} W of {:.1} W ({:.1}%)",
            self.total_load_w, self.capacity_w, self.utilization_pct
        )?;
        writeln!(f, "Available:      {:.1} W", self.available_w)?;
        if self.high_load_warning {
            writeln!(f, "Warning:        approaching maximum load capacity")?;
        }
        writeln!(f, "History:        {} record(s)", self.history_count)?;
        write!(
            f,
            "Energy:         {:.3} kWh (est. cost {:.2})",
            self.total_units_kwh, self.estimated_cost
        )
    }
}
