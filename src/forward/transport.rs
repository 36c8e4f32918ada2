//! Outbound transport.
//!
//! The engine hands a fully built request to an [`OutboundTransport`] and gets
//! back the upstream response head with a streaming body. Production traffic
//! goes through [`HttpTransport`]; tests plug in their own implementation.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, Request, Response};
use thiserror::Error;

/// Failure before any upstream response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build outbound client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("no upstream response within {0:?}")]
    Timeout(Duration),
}

/// Executes one outbound HTTP request.
#[async_trait]
pub trait OutboundTransport: Send + Sync {
    /// Send `request` and resolve once the upstream response headers arrive.
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Body>, TransportError>;
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport. `timeout` bounds the wait for response headers only.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        // The target is dialed directly; proxy environment variables are ignored.
        // Redirects are handed back to the caller untouched.
        let client = reqwest::Client::builder()
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl OutboundTransport for HttpTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = request.into_parts();

        // The client frames the buffered body itself.
        let mut headers = parts.headers;
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);

        let pending = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(headers)
            .body(body)
            .send();

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => pending.await,
        };

        let upstream = result.map_err(|err| {
            if err.is_connect() {
                TransportError::Unreachable(err.to_string())
            } else {
                TransportError::Request(err)
            }
        })?;

        let status = upstream.status();
        let headers = upstream.headers().clone();

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
