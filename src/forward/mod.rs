//! Trace forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! forward handler (http/handlers.rs)
//!     → engine.rs (buffer, rewrite, send once, relay)
//!     → rewrite.rs (URI and header rules)
//!     → transport.rs (OutboundTransport: reqwest in production)
//!     → relay.rs (streams the upstream body back, logs early ends)
//! ```
//!
//! # Design Decisions
//! - The engine is the only component that talks to the transport
//! - The transport is a trait object so tests can substitute it
//! - No retries: one inbound request, one outbound call

pub mod engine;
pub mod relay;
pub mod rewrite;
pub mod transport;

pub use engine::{ForwardSettings, TraceForwarder};
pub use relay::RelayBody;
pub use rewrite::{CLIENT_TRACE_ID, ENVOY_FORCE_TRACE};
pub use transport::{HttpTransport, OutboundTransport, TransportError};
