//! Recoverable error taxonomy for the simulation core.
//!
//! Every variant reports caller-supplied bad input or an invalid state
//! transition; none is fatal to the process. Capacity rejections carry
//! their figures in the [`crate::system::ToggleOutcome`] enum instead,
//! since a refused admission is a decision, not a failure.

use thiserror::Error;

/// Errors surfaced by registry, scheduler, and device operations.
#[derive(Debug, Error)]
pub enum SystemError {
    /// No device registered under the given id.
    #[error("device `{id}` not found")]
    NotFound { id: String },

    /// A device with this id is already registered.
    #[error("device id `{id}` is already registered")]
    DuplicateKey { id: String },

    /// `turn_on` called while the device is already on.
    #[error("device `{id}` is already on")]
    AlreadyOn { id: String },

    /// `turn_off` called while the device is already off.
    #[error("device `{id}` is already off")]
    AlreadyOff { id: String },

    /// Peek or dequeue on an empty task scheduler.
    #[error("no scheduled tasks pending")]
    EmptyQueue,

    /// Scheduled hour outside 0..=23.
    #[error("scheduled hour {hour} is out of range (expected 0-23)")]
    InvalidHour { hour: u8 },

    /// Scheduled duration of zero minutes.
    #[error("scheduled duration must be at least one minute")]
    InvalidDuration,
}
