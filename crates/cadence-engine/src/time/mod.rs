//! Time subsystem.
//!
//! Provides monotonic clock sources and per-loop frame timing without coupling
//! to any particular host.
//! Intended usage:
//! - one `Clock` shared by a frame host and the schedulers driven by it
//! - one `FrameClock` per frame loop, ticked once per repaint batch

mod clock;
mod frame_clock;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame_clock::{FrameClock, FrameTime};
