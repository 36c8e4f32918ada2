//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! HOST/PORT
//!     → listener.rs (resolve, bind TCP)
//!     → tls.rs (optional: load cert/key for rustls)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bind failures are fatal at startup
//! - TLS is optional and terminated in-process

pub mod listener;
pub mod tls;
