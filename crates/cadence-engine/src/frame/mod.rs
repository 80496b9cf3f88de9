//! Frame hosts.
//!
//! A host supplies the "run this just before the next repaint" primitive the
//! scheduler is driven by. `FrameLoop` is the built-in single-threaded host;
//! the `window` module adapts it to a winit redraw cycle.

mod host;
mod frame_loop;

pub use frame_loop::{FrameLoop, FrameLoopConfig, LoopHandle, LoopScheduler};
pub use host::{FrameCallback, FrameHost};
