//! Shared utilities for use cases.
//!
//! Cancellation checking and cancellable awaiting used by both the sub-task
//! runner and the orchestration engine.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Marker returned when the run's cancellation token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), Cancelled> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(Cancelled);
    }
    Ok(())
}

/// Await `future` unless the token fires first; the future is dropped on
/// cancellation.
pub(crate) async fn run_cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Result<F::Output, Cancelled> {
    check_cancelled(token)?;
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        },
        None => Ok(future.await),
    }
}
