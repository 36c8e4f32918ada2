//! Request handlers registered by the server router.
//!
//! - `health_handler`: readiness probe
//! - `debug_handler`: echoes headers, query and body as JSON
//! - `forward_handler`: hands trace requests to the forwarding engine

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::RelayError;
use crate::http::server::AppState;

/// 200 "OK" while ready, 500 with an empty body afterwards.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    if state.readiness.is_ready() {
        (StatusCode::OK, "OK").into_response()
    } else {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// Echo of an inbound request.
///
/// Maps are ordered by key so the same request always renders the same document.
/// Header names appear in canonical form (`Content-Type`); Host is not echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEcho {
    pub headers: BTreeMap<String, Vec<String>>,
    pub query_parameters: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl DebugEcho {
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &parts.headers {
            if *name == header::HOST {
                continue;
            }
            headers
                .entry(canonical_header_key(name.as_str()))
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let mut query_parameters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(query) = parts.uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                query_parameters
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }

        Self {
            headers,
            query_parameters,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Serialize with four-space indentation.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Uppercase the first letter of each `-`-separated segment, lowercase the rest.
pub fn canonical_header_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

pub async fn debug_handler(request: Request<Body>) -> Result<Response, RelayError> {
    tracing::info!(method = %request.method(), uri = %request.uri(), "Debug request received");

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(RelayError::ClientBodyRead)?;

    let json = DebugEcho::from_parts(&parts, &body).to_pretty_json()?;

    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

pub async fn forward_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, RelayError> {
    state.forwarder.forward(request).await
}
