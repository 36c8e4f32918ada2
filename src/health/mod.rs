//! Readiness subsystem.
//!
//! # Data Flow
//! ```text
//! Termination signal (lifecycle/signals.rs):
//!     → Readiness::mark_not_ready
//!
//! Health endpoint (http/handlers.rs):
//!     → Readiness::is_ready
//!     → 200 "OK" | 500
//! ```
//!
//! # Design Decisions
//! - One flag per server instance, shared through `Arc`
//! - The transition is one-way; nothing can make an instance ready again

pub mod state;

pub use state::Readiness;
