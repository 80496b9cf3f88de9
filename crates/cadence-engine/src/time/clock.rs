use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
///
/// Implementations must never go backwards; elapsed-time math downstream relies
/// on `Instant` ordering.
pub trait Clock: Clone + 'static {
    /// Returns the current monotonic time.
    fn now(&self) -> Instant;

    /// Blocks until `deadline` has been reached.
    ///
    /// Returns immediately when the deadline is already in the past.
    fn wait_until(&self, deadline: Instant) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Wall-clock backed by `Instant::now()`.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock.
///
/// Clones share the same timeline, so a frame host and the schedulers it
/// drives observe identical timestamps. Waiting on a `ManualClock` jumps
/// straight to the deadline instead of sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Sets the elapsed time since the clock's origin.
    ///
    /// Requests that would move time backwards are ignored.
    pub fn set_elapsed(&self, elapsed: Duration) {
        if elapsed > self.offset.get() {
            self.offset.set(elapsed);
        }
    }

    /// Time elapsed since the clock's origin.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn wait_until(&self, deadline: Instant) {
        self.set_elapsed(deadline.saturating_duration_since(self.origin));
    }
}
