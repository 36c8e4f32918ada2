//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap handles syntactic)
//! - Validate route shapes and detect colliding routes
//! - Validate the target host and metrics address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must start with '/', got {value:?}")]
    RouteNotAbsolute { field: &'static str, value: String },

    #[error("trace route must not be '/' or end with '/', got {0:?}")]
    TraceRouteShape(String),

    #[error("{first} and {second} both claim {path:?}")]
    RouteCollision {
        first: &'static str,
        second: &'static str,
        path: String,
    },

    #[error("trace header prefix must not be empty")]
    EmptyHeaderPrefix,

    #[error("target host {0:?} is not a valid host[:port]")]
    InvalidTargetHost(String),

    #[error("upstream timeout must be at least one second")]
    ZeroUpstreamTimeout,

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let routes = [
        ("health path", config.health_path.as_str()),
        ("debug path", config.debug_path.as_str()),
        ("trace route", config.trace_route.as_str()),
    ];

    for (field, value) in routes {
        if !value.starts_with('/') {
            errors.push(ValidationError::RouteNotAbsolute {
                field,
                value: value.to_string(),
            });
        }
    }

    let trace_route = config.trace_route.as_str();
    if trace_route == "/" || (trace_route.len() > 1 && trace_route.ends_with('/')) {
        errors.push(ValidationError::TraceRouteShape(trace_route.to_string()));
    }

    if config.health_path == config.debug_path {
        errors.push(ValidationError::RouteCollision {
            first: "health path",
            second: "debug path",
            path: config.health_path.clone(),
        });
    }

    // Anything at or below the trace route is forwarded, so the local
    // endpoints must live outside it.
    let forwarded = format!("{}/", trace_route);
    for &(field, value) in &routes[..2] {
        if value == trace_route || value.starts_with(&forwarded) {
            errors.push(ValidationError::RouteCollision {
                first: field,
                second: "trace route",
                path: value.to_string(),
            });
        }
    }

    if config.trace_header_prefix.trim().is_empty() {
        errors.push(ValidationError::EmptyHeaderPrefix);
    }

    if let Some(host) = config.target_host() {
        if Authority::from_str(host).is_err() {
            errors.push(ValidationError::InvalidTargetHost(host.to_string()));
        }
    }

    if config.upstream_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    if let Some(addr) = &config.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
