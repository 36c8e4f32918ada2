//! Request-scoped error types.
//!
//! Every variant stays local to one request. None of them stop the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::forward::TransportError;

/// Failure while handling a single relay or debug request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body could not be read.
    #[error("failed to read request body: {0}")]
    ClientBodyRead(#[source] axum::Error),

    /// The outbound URL or request could not be built.
    #[error("failed to build outbound request: {0}")]
    RequestConstruction(String),

    #[error("failed to generate trace id: {0}")]
    TraceIdGeneration(#[source] rand::Error),

    /// The upstream call failed before a response arrived.
    #[error(transparent)]
    UpstreamTransport(#[from] TransportError),

    /// Copying the upstream body to the caller broke after the status was sent.
    #[error("response relay interrupted: {0}")]
    ResponseRelay(String),

    #[error("failed to encode debug document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    /// Status returned to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::UpstreamTransport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = %status, "Request failed");

        // Callers only see the status; details go to the log.
        status.into_response()
    }
}
