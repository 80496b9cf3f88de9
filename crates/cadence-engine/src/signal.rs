//! One-shot completion signal for an animation run.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::FusedFuture;

use crate::error::AnimError;

/// Result delivered through a completion signal.
pub type RunResult = Result<(), AnimError>;

/// Sending half held by the run. Consumed on use, so a run can fulfill at most once.
pub(crate) struct Completer {
    tx: oneshot::Sender<RunResult>,
}

impl Completer {
    pub(crate) fn complete(self, result: RunResult) {
        // The caller may have dropped the signal; nobody is left to notify.
        let _ = self.tx.send(result);
    }
}

/// Resolves once the associated run finishes.
///
/// Yields `Ok(())` when the duration elapsed, or an `AnimError` if the callback
/// failed or the host dropped the run.
#[must_use = "a completion signal does nothing unless awaited or inspected"]
#[derive(Debug)]
pub struct CompletionSignal {
    rx: oneshot::Receiver<RunResult>,
    done: bool,
}

impl CompletionSignal {
    pub(crate) fn new() -> (Completer, Self) {
        let (tx, rx) = oneshot::channel();
        (Completer { tx }, Self { rx, done: false })
    }

    /// Non-blocking check.
    ///
    /// Returns `Some(result)` the first time the run is observed finished and
    /// `None` while it is still in flight or after the result was taken.
    pub fn try_complete(&mut self) -> Option<RunResult> {
        if self.done {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(AnimError::Abandoned),
        };
        self.done = true;
        Some(result)
    }
}

impl Future for CompletionSignal {
    type Output = RunResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(result) => {
                this.done = true;
                Poll::Ready(result.unwrap_or(Err(AnimError::Abandoned)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedFuture for CompletionSignal {
    fn is_terminated(&self) -> bool {
        self.done
    }
}
