//! Request rewriting rules.
//!
//! # Responsibilities
//! - Strip the trace route from the inbound path
//! - Assemble the outbound URI (scheme, host, path, verbatim query)
//! - Filter trace headers by case-insensitive prefix
//! - Stamp fresh trace headers
//!
//! # Design Decisions
//! - Plain prefix removal, never pattern matching
//! - Headers are appended in inbound order; duplicates survive
//! - Host is not copied; the outbound authority decides it

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::uri::{Scheme, Uri};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::RelayError;

pub const CLIENT_TRACE_ID: HeaderName = HeaderName::from_static("x-client-trace-id");
pub const ENVOY_FORCE_TRACE: HeaderName = HeaderName::from_static("x-envoy-force-trace");

/// Remove `route` from the start of `path`, once.
pub fn strip_route_prefix<'a>(path: &'a str, route: &str) -> &'a str {
    path.strip_prefix(route).unwrap_or(path)
}

/// Build the outbound URI. A non-empty query is reattached verbatim.
pub fn outbound_uri(
    scheme: &Scheme,
    host: &str,
    path: &str,
    query: Option<&str>,
) -> Result<Uri, RelayError> {
    let path = if path.is_empty() { "/" } else { path };

    let mut target = format!("{}://{}{}", scheme, host, path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }

    target
        .parse::<Uri>()
        .map_err(|e| RelayError::RequestConstruction(format!("invalid target {:?}: {}", target, e)))
}

/// Whether `name` starts with `prefix`, ignoring ASCII case.
pub fn is_filtered(name: &HeaderName, prefix: &str) -> bool {
    let name = name.as_str().as_bytes();
    let prefix = prefix.as_bytes();
    name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Copy every inbound header except Host and those matching `prefix`.
pub fn forwardable_headers(inbound: &HeaderMap, prefix: &str) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound {
        if *name == header::HOST || is_filtered(name, prefix) {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}

/// Set the trace headers the mesh keys its sampling on.
pub fn stamp_trace_headers(headers: &mut HeaderMap, trace_id: &Uuid) -> Result<(), RelayError> {
    let value = HeaderValue::from_str(&trace_id.to_string())
        .map_err(|e| RelayError::RequestConstruction(e.to_string()))?;

    headers.insert(CLIENT_TRACE_ID, value);
    headers.insert(ENVOY_FORCE_TRACE, HeaderValue::from_static("true"));
    Ok(())
}

/// Generate a random (v4) UUID from the OS entropy source.
pub fn new_trace_id() -> Result<Uuid, rand::Error> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}
