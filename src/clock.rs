//! Time sources for activation timestamps and usage durations.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// A monotonic-enough time source consumed by the core.
///
/// The core never reads the wall clock directly; it asks its `Clock` so that
/// tests can drive time deterministically with [`ManualClock`].
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-advanced clock for deterministic tests.
///
/// Interior mutability lets tests advance time while the system owns the
/// clock.
///
/// # Examples
///
/// ```
/// use hems_sim::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::default();
/// let start = clock.now();
/// clock.advance_secs(3600);
/// assert_eq!((clock.now() - start).num_seconds(), 3600);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a manual clock starting at the given instant.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Advances the clock by whole seconds.
    pub fn advance_secs(&self, seconds: i64) {
        self.now.set(self.now.get() + Duration::seconds(seconds));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
