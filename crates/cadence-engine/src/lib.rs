//! Cadence engine crate.
//!
//! Frame-synchronized animation timing: a progress callback is invoked once per
//! repaint, with progress normalized to `[0, 1]`, until a duration elapses; a
//! one-shot signal then resolves.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`anim`] | `FrameScheduler`, `SchedulerConfig`, `FinalFrame` |
//! | [`signal`] | `CompletionSignal` |
//! | [`frame`] | `FrameHost`, `FrameLoop` |
//! | [`time`] | `Clock`, `SystemClock`, `ManualClock`, `FrameClock` |
//! | [`error`] | `AnimError` |
//! | [`logging`] | `init_logging` |
//! | `window` | winit host (feature `window`) |
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use cadence_engine::frame::FrameLoop;
//! use cadence_engine::time::ManualClock;
//!
//! let frames = FrameLoop::new(ManualClock::new());
//! let done = frames.scheduler().run(
//!     |progress, label: &&str| println!("{label}: {progress:.2}"),
//!     Duration::from_millis(100),
//!     "fade",
//! );
//! frames.block_on(done).unwrap().unwrap();
//! ```

pub mod anim;
pub mod error;
pub mod frame;
pub mod logging;
pub mod signal;
pub mod time;

#[cfg(feature = "window")]
pub mod window;

pub use anim::{FinalFrame, FrameScheduler, SchedulerConfig};
pub use error::AnimError;
pub use signal::CompletionSignal;
