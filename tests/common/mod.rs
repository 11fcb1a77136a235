//! Shared fixtures for integration tests.

use hems_sim::clock::ManualClock;
use hems_sim::config::SystemConfig;
use hems_sim::system::EnergySystem;

/// System with the given capacity, default tariffs, and a manual clock
/// starting at the epoch.
pub fn system_with_capacity(capacity_w: f32) -> EnergySystem<ManualClock> {
    let config = SystemConfig {
        max_load_capacity_w: capacity_w,
        ..SystemConfig::default()
    };
    EnergySystem::with_clock(config, ManualClock::default())
}

/// Registers a non-critical device and returns its id for convenience.
pub fn register_load(
    system: &mut EnergySystem<ManualClock>,
    id: &str,
    watts: f32,
    priority: u8,
) -> String {
    system
        .register(id, &format!("Load {id}"), watts, false, priority)
        .expect("registration should succeed");
    id.to_string()
}

/// Registers a critical device and returns its id.
pub fn register_critical(system: &mut EnergySystem<ManualClock>, id: &str, watts: f32) -> String {
    system
        .register(id, &format!("Critical {id}"), watts, true, 1)
        .expect("registration should succeed");
    id.to_string()
}
