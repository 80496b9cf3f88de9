//! Frame-synchronized progress animation.
//!
//! `FrameScheduler::run` invokes a progress callback once per repaint until the
//! requested duration has elapsed, then resolves a `CompletionSignal`.

mod run;
mod scheduler;

pub use scheduler::{FinalFrame, FrameScheduler, SchedulerConfig};

#[cfg(test)]
mod tests;
