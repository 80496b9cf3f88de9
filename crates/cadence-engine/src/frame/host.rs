use crate::time::FrameTime;

/// Callback delivered once, at the next repaint.
pub type FrameCallback = Box<dyn FnOnce(FrameTime)>;

/// Per-frame scheduling primitive.
///
/// Contract:
/// - every registered callback is invoked at most once, at (or just before) the
///   next repaint, with that repaint's `FrameTime`
/// - registering from inside a callback is allowed; the new registration is
///   delivered with the following repaint, never the current one
/// - a host that shuts down drops its undelivered callbacks
pub trait FrameHost: Clone + 'static {
    fn request_frame(&self, callback: FrameCallback);
}
