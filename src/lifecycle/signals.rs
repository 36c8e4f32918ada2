//! OS signal handling.
//!
//! # Responsibilities
//! - Register the SIGTERM handler before traffic is accepted
//! - Translate SIGTERM into the readiness transition
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Receiving SIGTERM does not exit the process

use std::future::Future;
use std::sync::Arc;

use crate::health::Readiness;

/// Register for the termination signal.
///
/// The returned future resolves when the signal arrives. Registration happens
/// immediately, so a signal sent before the future is polled is not lost.
#[cfg(unix)]
pub fn termination() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        terminate.recv().await;
    })
}

#[cfg(not(unix))]
pub fn termination() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    })
}

/// Mark the instance not ready once `signal` resolves.
pub async fn mark_unready_on<F>(signal: F, readiness: Arc<Readiness>)
where
    F: Future<Output = ()>,
{
    signal.await;
    readiness.mark_not_ready();
    tracing::info!("Termination signal received. Marked unhealthy and waiting to be killed");
}
