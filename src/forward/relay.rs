//! Upstream body relay.
//!
//! Once the upstream status and headers are handed to the server, the body is
//! polled by hyper on the caller's connection. [`RelayBody`] watches that
//! stream so an early end is logged from either side:
//! - upstream stream error → `ResponseRelay` warning, error passed on
//! - caller disconnect → hyper drops the body unfinished → warning on drop

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};

use crate::error::RelayError;

/// Upstream response body that reports an unfinished relay.
pub struct RelayBody {
    inner: Body,
    target: String,
    finished: bool,
}

impl RelayBody {
    pub fn new(inner: Body, target: String) -> Self {
        Self {
            inner,
            target,
            finished: false,
        }
    }

    /// Whether the relay stopped before the upstream body ended.
    pub fn cut_short(&self) -> bool {
        !self.finished && !self.inner.is_end_stream()
    }
}

impl HttpBody for RelayBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = &mut *self;

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                let err = RelayError::ResponseRelay(e.to_string());
                tracing::warn!(target_url = %this.target, error = %err, "Relay aborted mid-body");
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        if self.cut_short() {
            tracing::warn!(
                target_url = %self.target,
                "Caller went away before the upstream body was fully relayed"
            );
        }
    }
}
