//! Trace relay library.
//!
//! Forwards requests arriving under a trace route to a target host, replacing
//! inbound trace headers with a fresh client trace id.

pub mod config;
pub mod error;
pub mod forward;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::RelayConfig;
pub use error::RelayError;
pub use health::Readiness;
pub use http::RelayServer;
