//! Bulkhead isolation onto a bounded worker pool
//!
//! Admitted work is spawned as its own tokio task, so slowness in the
//! guarded call cannot tie up the caller's worker, and the semaphore bounds
//! how many of those tasks exist at once. Callers beyond the concurrency
//! limit wait in a bounded queue; callers beyond the queue are rejected.
//!
//! The future handed to [`Bulkhead::call`] crosses a task boundary: it must
//! own everything it needs (request-scoped context included), because
//! nothing from the submitting task is inherited implicitly.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Semaphore, TryAcquireError};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct BulkheadConfig {
    /// Maximum calls running concurrently on the isolated pool
    pub max_concurrent_calls: usize,
    /// Maximum callers allowed to wait for a slot
    pub max_queue_depth: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 10,
            max_queue_depth: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BulkheadError {
    #[error("Bulkhead full: {max_concurrent_calls} in flight, {max_queue_depth} queued")]
    Full {
        max_concurrent_calls: usize,
        max_queue_depth: usize,
    },
    #[error("Bulkhead is shut down")]
    Closed,
    #[error("Isolated task failed: {0}")]
    TaskFailed(String),
}

#[derive(Clone)]
pub struct Bulkhead {
    config: BulkheadConfig,
    semaphore: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
}

impl Bulkhead {
    pub fn new(config: BulkheadConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_calls)),
            queued: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    /// Run `future` on the isolated pool, waiting in the bounded queue if
    /// every slot is taken. Rejects with [`BulkheadError::Full`] once the
    /// queue is also at capacity.
    pub async fn call<F>(&self, future: F) -> Result<F::Output, BulkheadError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => return Err(BulkheadError::Closed),
            Err(TryAcquireError::NoPermits) => {
                let queued = self.queued.fetch_add(1, Ordering::AcqRel) + 1;
                if queued > self.config.max_queue_depth {
                    self.queued.fetch_sub(1, Ordering::AcqRel);
                    warn!(
                        "Bulkhead rejected a call ({} in flight, {} queued)",
                        self.config.max_concurrent_calls, self.config.max_queue_depth
                    );
                    return Err(BulkheadError::Full {
                        max_concurrent_calls: self.config.max_concurrent_calls,
                        max_queue_depth: self.config.max_queue_depth,
                    });
                }

                let acquired = self.semaphore.clone().acquire_owned().await;
                self.queued.fetch_sub(1, Ordering::AcqRel);
                acquired.map_err(|_| BulkheadError::Closed)?
            }
        };

        let handle = tokio::spawn(async move {
            let _permit = permit; // held for the task's lifetime
            future.await
        });

        handle
            .await
            .map_err(|e| BulkheadError::TaskFailed(e.to_string()))
    }

    /// Slots currently free (for monitoring)
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Callers currently waiting for a slot (for monitoring)
    pub fn queued_callers(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }
}
