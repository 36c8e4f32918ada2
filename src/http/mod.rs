//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs
//!         {health-path}      → readiness probe
//!         {debug-path}       → JSON echo
//!         {trace-route}/*    → forward engine → upstream
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use handlers::DebugEcho;
pub use server::{AppState, RelayServer};
