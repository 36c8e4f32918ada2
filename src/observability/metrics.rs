//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_forward_requests_total` (counter): forwarded requests by method, status
//! - `relay_forward_duration_seconds` (histogram): time until upstream headers
//! - `relay_ready` (gauge): 1=ready, 0=not ready

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one forwarded request.
pub fn record_forward(method: &Method, status: u16, start: Instant) {
    let method = method.to_string();

    metrics::counter!(
        "relay_forward_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("relay_forward_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_readiness(ready: bool) {
    metrics::gauge!("relay_ready").set(if ready { 1.0 } else { 0.0 });
}
