//! Timeout budget for guarded operations
//!
//! On elapse the guarded future is dropped, which cancels it cooperatively;
//! the worker it ran on is immediately free for other work.

use std::future::Future;
use std::time::Duration;

/// The guarded operation exceeded its budget. Carries the budget that was
/// blown so callers can report it.
#[derive(Debug, thiserror::Error)]
#[error("Operation timed out after {0:?}")]
pub struct TimeoutElapsed(pub Duration);

/// Run a future against a fixed budget
pub async fn with_timeout<F, T>(budget: Duration, future: F) -> Result<T, TimeoutElapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(budget, future)
        .await
        .map_err(|_| TimeoutElapsed(budget))
}
