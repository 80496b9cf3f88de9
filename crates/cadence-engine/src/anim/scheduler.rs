use std::time::Duration;

use crate::frame::FrameHost;
use crate::signal::CompletionSignal;
use crate::time::Clock;

use super::run::AnimationRun;

/// What happens on the frame that observes the duration has elapsed.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FinalFrame {
    /// Resolve the signal without invoking the callback; the last observed
    /// progress stays strictly below `1.0`.
    #[default]
    Skip,
    /// Invoke the callback once more with progress `1.0`, then resolve.
    Emit,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub final_frame: FinalFrame,
}

/// Starts animation runs on a frame host.
///
/// The scheduler holds no per-run state: every call to `run` bundles its start
/// time, duration, callback and arguments into a run owned by the host's frame
/// callback chain, so concurrent runs never observe each other.
#[derive(Clone)]
pub struct FrameScheduler<H: FrameHost, C: Clock> {
    host: H,
    clock: C,
    config: SchedulerConfig,
}

impl<H: FrameHost, C: Clock> FrameScheduler<H, C> {
    pub fn new(host: H, clock: C) -> Self {
        Self::with_config(host, clock, SchedulerConfig::default())
    }

    pub fn with_config(host: H, clock: C, config: SchedulerConfig) -> Self {
        Self { host, clock, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Animates `callback` over `duration`.
    ///
    /// The callback receives progress in `[0, 1]` and a reference to `args` on
    /// every frame until `duration` has elapsed. A zero duration resolves on the
    /// first frame without invoking the callback.
    ///
    /// A panicking callback halts the run and rejects the signal with
    /// `AnimError::CallbackPanicked`.
    pub fn run<A, F>(&self, mut callback: F, duration: Duration, args: A) -> CompletionSignal
    where
        A: 'static,
        F: FnMut(f64, &A) + 'static,
    {
        self.try_run(
            move |progress, args: &A| {
                callback(progress, args);
                Ok(())
            },
            duration,
            args,
        )
    }

    /// Like `run`, with a fallible callback.
    ///
    /// An `Err` halts the run: no further frame is requested and the signal
    /// resolves with `AnimError::Callback`.
    pub fn try_run<A, F>(&self, callback: F, duration: Duration, args: A) -> CompletionSignal
    where
        A: 'static,
        F: FnMut(f64, &A) -> anyhow::Result<()> + 'static,
    {
        let (run, signal) = AnimationRun::start(
            self.host.clone(),
            self.clock.clone(),
            duration,
            callback,
            args,
            self.config.final_frame,
        );
        run.schedule();
        signal
    }
}
