use thiserror::Error;

/// Failure modes of an animation run or of the loop driving it.
#[derive(Debug, Error)]
pub enum AnimError {
    /// A fallible progress callback returned an error; the run was halted.
    #[error("animation callback failed: {0:#}")]
    Callback(anyhow::Error),

    /// The progress callback panicked; the run was halted.
    #[error("animation callback panicked: {0}")]
    CallbackPanicked(String),

    /// The host dropped the run's pending frame without delivering it.
    #[error("animation run abandoned before completion")]
    Abandoned,

    /// The future being driven is pending but no frame is scheduled to advance it.
    #[error("frame loop stalled: no frames pending")]
    Stalled,
}

impl AnimError {
    /// Builds `CallbackPanicked` from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::CallbackPanicked(message)
    }
}
