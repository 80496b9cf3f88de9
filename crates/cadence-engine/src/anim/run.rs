use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::AnimError;
use crate::frame::FrameHost;
use crate::signal::{Completer, CompletionSignal, RunResult};
use crate::time::{Clock, FrameTime};

use super::FinalFrame;

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// State of one in-flight animation.
///
/// Owned by whichever frame callback is currently registered with the host;
/// exactly one registration is pending per run until it finishes.
pub(super) struct AnimationRun<H, C, A, F> {
    id: u64,
    host: H,
    clock: C,
    start: Instant,
    duration: Duration,
    callback: F,
    args: A,
    final_frame: FinalFrame,
    completer: Completer,
    last_progress: f64,
    frames: u64,
}

impl<H, C, A, F> AnimationRun<H, C, A, F>
where
    H: FrameHost,
    C: Clock,
    A: 'static,
    F: FnMut(f64, &A) -> anyhow::Result<()> + 'static,
{
    pub(super) fn start(
        host: H,
        clock: C,
        duration: Duration,
        callback: F,
        args: A,
        final_frame: FinalFrame,
    ) -> (Box<Self>, CompletionSignal) {
        let (completer, signal) = CompletionSignal::new();
        let id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);
        let start = clock.now();

        log::debug!("animation #{id} started: duration {duration:?}");

        let run = Box::new(Self {
            id,
            host,
            clock,
            start,
            duration,
            callback,
            args,
            final_frame,
            completer,
            last_progress: 0.0,
            frames: 0,
        });
        (run, signal)
    }

    /// Registers this run for the next repaint.
    pub(super) fn schedule(self: Box<Self>) {
        let host = self.host.clone();
        host.request_frame(Box::new(move |ft: FrameTime| self.on_frame(ft)));
    }

    fn on_frame(mut self: Box<Self>, ft: FrameTime) {
        self.frames += 1;
        let elapsed = self.clock.now().saturating_duration_since(self.start);

        if elapsed < self.duration {
            let progress = self.progress(elapsed);
            log::trace!(
                "animation #{} frame {}: progress {progress:.4}",
                self.id,
                ft.frame_index
            );
            match self.invoke(progress) {
                Ok(()) => self.schedule(),
                Err(e) => self.finish(Err(e)),
            }
            return;
        }

        if self.final_frame == FinalFrame::Emit {
            if let Err(e) = self.invoke(1.0) {
                return self.finish(Err(e));
            }
        }
        self.finish(Ok(()));
    }

    /// Normalized progress, clamped to `[0, 1]` and never below the last value handed out.
    fn progress(&mut self, elapsed: Duration) -> f64 {
        let raw = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let progress = raw.clamp(0.0, 1.0).max(self.last_progress);
        self.last_progress = progress;
        progress
    }

    fn invoke(&mut self, progress: f64) -> Result<(), AnimError> {
        let Self { callback, args, .. } = self;
        match panic::catch_unwind(AssertUnwindSafe(|| callback(progress, &*args))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AnimError::Callback(e)),
            Err(payload) => Err(AnimError::from_panic(payload)),
        }
    }

    fn finish(self: Box<Self>, result: RunResult) {
        let run = *self;
        match &result {
            Ok(()) => log::debug!(
                "animation #{} completed after {} frame(s)",
                run.id,
                run.frames
            ),
            Err(e) => log::warn!("animation #{} halted after {} frame(s): {e}", run.id, run.frames),
        }
        run.completer.complete(result);
    }
}
