use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::Inner;
use crate::protocol::{CallId, ResponseBody};
use crate::{OrthoError, Result};

/// Future resolving to the response a request is bound to.
///
/// Returned immediately when a request is sent; `R` is the request's
/// associated response type, so the handle can only ever yield that shape.
///
/// Dropping an unresolved handle withdraws its pending call. A response that
/// arrives afterwards is treated as unsolicited.
///
/// Like other futures, a handle panics if polled again after it completed.
#[must_use = "a response handle does nothing unless awaited"]
pub struct ResponseHandle<R: ResponseBody> {
    id: CallId,
    rx: oneshot::Receiver<Result<R>>,
    table: Weak<Inner>,
    settled: bool,
}

impl<R: ResponseBody> ResponseHandle<R> {
    // ---
    pub(super) fn new(id: CallId, rx: oneshot::Receiver<Result<R>>, table: Weak<Inner>) -> Self {
        // ---
        Self {
            id,
            rx,
            table,
            settled: false,
        }
    }

    /// Identity of the pending call, for cancelling or failing it.
    pub fn id(&self) -> CallId {
        self.id
    }
}

impl<R: ResponseBody> Future for ResponseHandle<R> {
    type Output = Result<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // ---
        let this = &mut *self;
        assert!(!this.settled, "{} polled after completion", this.id);

        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => {
                this.settled = true;
                Poll::Ready(outcome)
            }
            Poll::Ready(Err(_)) => {
                this.settled = true;
                Poll::Ready(Err(OrthoError::Transport(format!(
                    "{} dropped before it was resolved",
                    this.id
                ))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R: ResponseBody> Drop for ResponseHandle<R> {
    fn drop(&mut self) {
        // ---
        if self.settled {
            return;
        }
        if let Some(inner) = self.table.upgrade() {
            inner.withdraw(self.id);
        }
    }
}

impl<R: ResponseBody> std::fmt::Debug for ResponseHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandle")
            .field("id", &self.id)
            .field("expected", &R::KIND)
            .field("settled", &self.settled)
            .finish()
    }
}
