//! TCP listener setup.
//!
//! # Responsibilities
//! - Resolve the configured host and port
//! - Bind the plain-HTTP listener

use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Host did not resolve to a usable address.
    Resolve(std::io::Error),
    /// Failed to bind to address.
    Bind(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Resolve(e) => write!(f, "Failed to resolve bind address: {}", e),
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// Resolve `host:port` to the first matching socket address.
pub async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    lookup_host((host, port))
        .await
        .map_err(ListenerError::Resolve)?
        .next()
        .ok_or_else(|| {
            ListenerError::Resolve(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("{} resolved to no addresses", host),
            ))
        })
}

/// Bind a TCP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
    let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
