use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::anim::{FrameScheduler, SchedulerConfig};
use crate::error::AnimError;
use crate::time::{Clock, FrameClock, SystemClock};

use super::{FrameCallback, FrameHost};

/// Scheduler bound to a `FrameLoop`.
pub type LoopScheduler<C = SystemClock> = FrameScheduler<LoopHandle<C>, C>;

/// Frame loop configuration.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Target spacing between repaint batches when the loop paces itself.
    pub frame_interval: Duration,
    /// Lower clamp for `FrameTime::dt`.
    pub dt_min: Duration,
    /// Upper clamp for `FrameTime::dt`.
    pub dt_max: Duration,
}

impl FrameLoopConfig {
    /// Config pacing frames at `hz` repaints per second.
    pub fn with_refresh_rate(hz: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / hz.max(1),
            ..Self::default()
        }
    }
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_nanos(16_666_667), // 60 Hz
            dt_min: FrameClock::<SystemClock>::DT_MIN,
            dt_max: FrameClock::<SystemClock>::DT_MAX,
        }
    }
}

struct LoopInner<C: Clock> {
    clock: C,
    frame_interval: Duration,
    frame_clock: RefCell<FrameClock<C>>,
    pending: RefCell<Vec<FrameCallback>>,
    next_deadline: Cell<Option<Instant>>,
}

/// Single-threaded repaint loop.
///
/// Frame callbacks are queued and delivered in batches, in registration order.
/// A callback registered while a batch is being delivered waits for the next
/// batch. `FrameLoop` is a cheap handle; clones drive the same queue.
///
/// Dropping the last `FrameLoop` handle drops all undelivered callbacks, which
/// resolves any in-flight completion signals with `AnimError::Abandoned`.
pub struct FrameLoop<C: Clock = SystemClock> {
    inner: Rc<LoopInner<C>>,
}

impl<C: Clock> Clone for FrameLoop<C> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, FrameLoopConfig::default())
    }

    pub fn with_config(clock: C, config: FrameLoopConfig) -> Self {
        let frame_clock = FrameClock::with_clamps(clock.clone(), config.dt_min, config.dt_max);
        Self {
            inner: Rc::new(LoopInner {
                clock,
                frame_interval: config.frame_interval,
                frame_clock: RefCell::new(frame_clock),
                pending: RefCell::new(Vec::new()),
                next_deadline: Cell::new(None),
            }),
        }
    }

    /// Weak host handle for schedulers.
    ///
    /// Runs hold this handle across frames; it does not keep the loop alive.
    pub fn handle(&self) -> LoopHandle<C> {
        LoopHandle { inner: Rc::downgrade(&self.inner) }
    }

    /// Scheduler driven by this loop and reading its clock.
    pub fn scheduler(&self) -> LoopScheduler<C> {
        self.scheduler_with(SchedulerConfig::default())
    }

    pub fn scheduler_with(&self, config: SchedulerConfig) -> LoopScheduler<C> {
        FrameScheduler::with_config(self.handle(), self.inner.clock.clone(), config)
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    /// Number of callbacks waiting for the next batch.
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Earliest time the next paced batch is due, if a batch was delivered before.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.next_deadline.get()
    }

    /// Delivers one repaint batch immediately.
    ///
    /// Returns the number of callbacks invoked. An empty queue does not tick
    /// the frame clock.
    pub fn pump(&self) -> usize {
        let batch = std::mem::take(&mut *self.inner.pending.borrow_mut());
        if batch.is_empty() {
            return 0;
        }

        let ft = self.inner.frame_clock.borrow_mut().tick();
        self.inner
            .next_deadline
            .set(Some(ft.now + self.inner.frame_interval));

        let delivered = batch.len();
        log::trace!(
            "frame {}: delivering {delivered} callback(s), dt {:.4}s",
            ft.frame_index,
            ft.dt
        );

        for callback in batch {
            callback(ft);
        }

        delivered
    }

    /// Waits, through the loop's clock, until the next batch is due.
    pub fn wait_for_next_frame(&self) {
        if let Some(deadline) = self.inner.next_deadline.get() {
            self.inner.clock.wait_until(deadline);
        }
    }

    /// Drives paced repaint batches until `future` resolves.
    ///
    /// The future is polled once up front and again after every batch. Returns
    /// `AnimError::Stalled` if it is still pending while no frame is queued,
    /// since nothing the loop does could make progress.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, AnimError> {
        let mut future = std::pin::pin!(future);
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return Ok(output);
            }

            if self.pending() == 0 {
                log::warn!("frame loop stalled with a pending future and no queued frames");
                return Err(AnimError::Stalled);
            }

            self.wait_for_next_frame();
            self.pump();
        }
    }
}

/// Non-owning `FrameHost` view of a `FrameLoop`.
pub struct LoopHandle<C: Clock> {
    inner: Weak<LoopInner<C>>,
}

impl<C: Clock> Clone for LoopHandle<C> {
    fn clone(&self) -> Self {
        Self { inner: Weak::clone(&self.inner) }
    }
}

impl<C: Clock> FrameHost for LoopHandle<C> {
    fn request_frame(&self, callback: FrameCallback) {
        match self.inner.upgrade() {
            Some(inner) => inner.pending.borrow_mut().push(callback),
            None => log::debug!("frame requested on a dropped loop; discarding"),
        }
    }
}
