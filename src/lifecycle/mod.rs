//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse config → Validate → Init logging/metrics → Build server → Serve
//!
//! Signals (signals.rs):
//!     SIGTERM → Readiness: ready → not ready
//!     (process keeps serving until the orchestrator kills it)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No draining: the load balancer stops routing once health checks fail

pub mod signals;
