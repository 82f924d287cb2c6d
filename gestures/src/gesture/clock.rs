//! Monotonic time sources for temporal gestures.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A non-decreasing time source.
///
/// `now` is measured from an arbitrary fixed origin; only differences
/// between readings are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock-independent clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Externally driven clock for replay and tests.
///
/// Clones share the same reading, so a caller can keep a handle while a
/// detector owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current reading.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Move the reading forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
