//! Time sources for trackers.
//!
//! Every timing decision a tracker makes (sample intervals, redraw throttling, elapsed
//! time) reads the clock through the [`Clock`] trait. Production code uses
//! [`SystemClock`]; [`ManualClock`] lets callers step time explicitly, which makes
//! rate and ETA behavior reproducible.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use web_time::Instant;

/// A monotonic time source.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// The wall clock (`Instant::now()`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a caller can keep one handle while a
/// tracker owns another.
///
/// ```ignore
/// use std::time::Duration;
/// use eta_progress::{Bounded, ManualClock, Silent, TrackerConfig, Tracker as _};
///
/// let clock = ManualClock::new();
/// let mut bar = Bounded::with_clock(TrackerConfig::new().max(10), clock.clone(), Silent)?;
/// clock.advance(Duration::from_secs(1));
/// bar.advance();
/// assert_eq!(bar.eta(), 9);
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        *self.now.lock() += step;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Clock as _, ManualClock, SystemClock};

    /// Shared Handles
    /// Advancing one clone is visible through every other clone.
    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let t0 = clock.now();

        handle.advance(Duration::from_millis(250));

        assert_eq!(clock.now().duration_since(t0), Duration::from_millis(250));
        assert_eq!(clock.now(), handle.now());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
