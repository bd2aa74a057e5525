//! Frame clocks.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of per-cycle elapsed time.
pub trait Clock {
    /// Time since the previous call, or since construction on the first call.
    fn restart(&mut self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    last: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}

/// Clock advanced by hand.
///
/// Clones share the same time source, so a test can keep one handle and give
/// the other to a manager.
///
/// ```rust
/// use stagehand::manager::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let handle = ManualClock::new();
/// let mut clock = handle.clone();
///
/// handle.advance(Duration::from_millis(16));
/// assert_eq!(clock.restart(), Duration::from_millis(16));
/// assert_eq!(clock.restart(), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    last: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward for every clone of this clock.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Total time advanced so far.
    pub fn now(&self) -> Duration {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn restart(&mut self) -> Duration {
        let now = self.now.get();
        let elapsed = now.saturating_sub(self.last);
        self.last = now;
        elapsed
    }
}
