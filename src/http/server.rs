//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing with per-request ids, panic recovery)
//! - Own the readiness flag and the outbound transport
//! - Serve over plain TCP or TLS

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    routing::{any, get},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::Span;

use crate::config::RelayConfig;
use crate::forward::rewrite::new_trace_id;
use crate::forward::{HttpTransport, OutboundTransport, TraceForwarder, TransportError};
use crate::health::Readiness;
use crate::http::handlers::{debug_handler, forward_handler, health_handler};

const REQUEST_ID: &str = "x-request-id";

/// Request id for log correlation: the caller's `x-request-id`, else a fresh UUID.
///
/// Only recorded on the request span; headers are never touched.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| new_trace_id().ok().map(|id| id.to_string()))
        .unwrap_or_else(|| "-".to_string())
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        uri = %request.uri()
    )
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<TraceForwarder>,
    pub readiness: Arc<Readiness>,
}

/// HTTP server for the trace relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
    readiness: Arc<Readiness>,
}

impl RelayServer {
    /// Create a server that forwards through the production transport.
    pub fn new(config: RelayConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.upstream_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server that forwards through `transport`.
    pub fn with_transport(config: RelayConfig, transport: Arc<dyn OutboundTransport>) -> Self {
        let readiness = Arc::new(Readiness::new());
        let forwarder = Arc::new(TraceForwarder::new(config.forward_settings(), transport));

        let state = AppState {
            forwarder,
            readiness: readiness.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            readiness,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        // `{*path}` needs at least one character, so the bare `route/` is
        // registered on its own.
        let trace_root = format!("{}/", config.trace_route);
        let trace_wildcard = format!("{}/{{*path}}", config.trace_route);

        Router::new()
            .route(&config.health_path, get(health_handler).post(health_handler))
            .route(&config.debug_path, any(debug_handler))
            .route(&trace_root, any(forward_handler))
            .route(&trace_wildcard, any(forward_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http().make_span_with(request_span))
                    .layer(CatchPanicLayer::new()),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared handle to this server's readiness flag.
    pub fn readiness(&self) -> Arc<Readiness> {
        self.readiness.clone()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until the process is killed.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            trace_route = %self.config.trace_route,
            target_host = self.config.target_host().unwrap_or("<inbound host>"),
            "HTTP server starting"
        );

        axum::serve(listener, self.router).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` with the given certificate config.
    pub async fn run_tls(self, addr: SocketAddr, tls: RustlsConfig) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            trace_route = %self.config.trace_route,
            target_host = self.config.target_host().unwrap_or("<inbound host>"),
            "HTTPS server starting"
        );

        axum_server::bind_rustls(addr, tls)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
