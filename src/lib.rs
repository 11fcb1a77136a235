//! Home energy management simulation core.
//!
//! Devices register against a fixed power-capacity budget, turn on and off,
//! accrue usage history, and may be queued for future activation. Admission
//! of a new load is capacity-checked; critical devices may trigger greedy
//! load shedding of lower-priority active devices to free headroom.

pub mod clock;
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod export;
pub mod history;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod system;
