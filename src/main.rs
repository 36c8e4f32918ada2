//! Trace relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 TRACE RELAY                  │
//!                        │                                              │
//!   Client Request       │  ┌──────────┐    ┌──────────────────────┐    │
//!   ─────────────────────┼─▶│ listener │───▶│ router (axum)        │    │
//!                        │  │ + tls    │    │  /health  /debug     │    │
//!                        │  └──────────┘    │  {trace-route}/*     │    │
//!                        │                  └─────────┬────────────┘    │
//!                        │                            ▼                 │
//!                        │                  ┌──────────────────────┐    │
//!                        │                  │ forward engine       │    │
//!                        │                  │ rewrite + trace ids  │    │
//!   Client Response      │                  └─────────┬────────────┘    │
//!   ◀────────────────────┼────── relay ◀──── transport ◀──────────────┼──── Target
//!                        │                                              │
//!                        │  readiness ◀── SIGTERM     logging / metrics │
//!                        └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use trace_relay::config::{validate_config, RelayConfig};
use trace_relay::lifecycle::signals;
use trace_relay::net::{listener, tls};
use trace_relay::observability::{logging, metrics};
use trace_relay::RelayServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig::parse();

    logging::init_logging(config.log_format);
    tracing::info!("trace-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    tracing::info!(
        host = %config.host,
        port = config.bind_port(),
        tls = config.tls_enabled,
        target_host = config.target_host().unwrap_or("<inbound host>"),
        trace_route = %config.trace_route,
        header_prefix = %config.trace_header_prefix,
        "Configuration loaded"
    );

    if let Some(addr) = &config.metrics_address {
        metrics::init_metrics(addr.parse()?)?;
    }

    let server = RelayServer::new(config.clone())?;

    // Register before binding so an early SIGTERM is not lost.
    let termination = signals::termination()?;
    tokio::spawn(signals::mark_unready_on(termination, server.readiness()));

    let addr = listener::resolve_bind_addr(&config.host, config.bind_port()).await?;

    if config.tls_enabled {
        let tls_config = tls::load_tls_config(&config.tls_cert_path, &config.tls_key_path).await?;
        server.run_tls(addr, tls_config).await?;
    } else {
        let listener = listener::bind(addr).await?;
        server.run(listener).await?;
    }

    Ok(())
}
