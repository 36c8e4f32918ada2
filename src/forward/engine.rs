//! Trace forwarding engine.
//!
//! # Flow
//! ```text
//! inbound request
//!     → buffer body
//!     → rewrite URI (target host, scheme, stripped path, verbatim query)
//!     → copy headers minus trace prefix, stamp fresh trace id
//!     → OutboundTransport::send (exactly once)
//!     → relay status, headers, streaming body (relay.rs)
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::uri::Scheme;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;

use crate::error::RelayError;
use crate::forward::rewrite::{
    forwardable_headers, new_trace_id, outbound_uri, stamp_trace_headers, strip_route_prefix,
    CLIENT_TRACE_ID,
};
use crate::forward::relay::RelayBody;
use crate::forward::transport::OutboundTransport;
use crate::observability::metrics;

/// Resolved settings the engine works from.
#[derive(Debug, Clone)]
pub struct ForwardSettings {
    /// Outbound authority. `None` reuses the inbound Host header.
    pub target_host: Option<String>,
    /// Path prefix removed from the inbound path.
    pub trace_route: String,
    /// Case-insensitive prefix of headers that are not forwarded.
    pub header_filter_prefix: String,
    /// Whether inbound connections are TLS-terminated by this process.
    pub inbound_tls: bool,
}

/// Turns inbound trace requests into exactly one outbound call.
pub struct TraceForwarder {
    settings: ForwardSettings,
    transport: Arc<dyn OutboundTransport>,
}

impl TraceForwarder {
    pub fn new(settings: ForwardSettings, transport: Arc<dyn OutboundTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &ForwardSettings {
        &self.settings
    }

    /// Derive the outbound request from the inbound head and its buffered body.
    pub fn build_outbound(&self, inbound: &Parts, body: Bytes) -> Result<Request<Bytes>, RelayError> {
        let host = match &self.settings.target_host {
            Some(host) => host.clone(),
            None => inbound_host(inbound)?,
        };
        let scheme = if self.settings.inbound_tls {
            Scheme::HTTPS
        } else {
            Scheme::HTTP
        };
        let path = strip_route_prefix(inbound.uri.path(), &self.settings.trace_route);
        let uri = outbound_uri(&scheme, &host, path, inbound.uri.query())?;

        let mut headers = forwardable_headers(&inbound.headers, &self.settings.header_filter_prefix);
        let trace_id = new_trace_id().map_err(RelayError::TraceIdGeneration)?;
        stamp_trace_headers(&mut headers, &trace_id)?;

        let mut request = Request::new(body);
        *request.method_mut() = inbound.method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }

    /// Forward `request` upstream and relay the response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, RelayError> {
        let start = Instant::now();
        let (parts, body) = request.into_parts();

        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(RelayError::ClientBodyRead)?;

        let outbound = self.build_outbound(&parts, body)?;
        let target = outbound.uri().to_string();
        let trace_id = outbound
            .headers()
            .get(CLIENT_TRACE_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        tracing::info!(
            method = %parts.method,
            target = %target,
            trace_id = %trace_id,
            "Forwarding traced request"
        );

        let upstream = match self.transport.send(outbound).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_forward(&parts.method, 502, start);
                return Err(e.into());
            }
        };

        let status = upstream.status();
        metrics::record_forward(&parts.method, status.as_u16(), start);
        tracing::debug!(target = %target, status = %status, "Upstream responded");

        // Status and headers are committed once this response is returned, so
        // a broken relay can only be logged.
        let (head, body) = upstream.into_parts();
        if !carries_body(&parts.method, status) {
            return Ok(Response::from_parts(head, body));
        }

        Ok(Response::from_parts(head, Body::new(RelayBody::new(body, target))))
    }
}

/// HEAD replies and 1xx/204/304 statuses never carry a body, so the server
/// drops theirs without polling it.
fn carries_body(method: &Method, status: StatusCode) -> bool {
    !(*method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

fn inbound_host(inbound: &Parts) -> Result<String, RelayError> {
    inbound
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| inbound.uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| RelayError::RequestConstruction("request has no Host".to_string()))
}
