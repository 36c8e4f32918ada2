//! Readiness state machine.
//!
//! # States
//! - Ready: instance keeps receiving traffic (initial)
//! - NotReady: instance asks to be taken out of rotation (terminal)
//!
//! # State Transitions
//! ```text
//! Ready → NotReady: termination signal received
//! ```
//!
//! # Design Decisions
//! - Lock-free: a single `AtomicBool`, read by every health check
//! - No transition back to Ready exists in the API

use std::sync::atomic::{AtomicBool, Ordering};

use crate::observability::metrics;

/// Process readiness as reported by the health endpoint.
#[derive(Debug)]
pub struct Readiness {
    ready: AtomicBool,
}

impl Readiness {
    /// Create a readiness flag in the Ready state.
    pub fn new() -> Self {
        metrics::record_readiness(true);
        Self {
            ready: AtomicBool::new(true),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Move to NotReady.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_not_ready(&self) -> bool {
        let was_ready = self.ready.swap(false, Ordering::AcqRel);
        if was_ready {
            metrics::record_readiness(false);
            tracing::warn!("Readiness changed: ready -> not ready");
        }
        was_ready
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
