//! Bounded wait for the worker pool

use crate::{pool::CompletionTracker, types::CompletionState};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Race "every worker has reported" against `timeout`; the first to happen wins
pub async fn wait_with_timeout(tracker: &CompletionTracker, timeout: Duration) -> CompletionState {
    match tokio::time::timeout(timeout, tracker.wait()).await {
        Ok(()) => CompletionState::Finished,
        Err(_) => CompletionState::TimedOut,
    }
}

/// Cancel outstanding probes and give them `grace` to record their results.
///
/// Returns true if every worker reported within the grace period.
pub async fn cancel_and_drain(
    tracker: &CompletionTracker,
    cancel: &CancellationToken,
    grace: Duration,
) -> bool {
    cancel.cancel();
    wait_with_timeout(tracker, grace).await == CompletionState::Finished
}
