//! Bounded offload of blocking work
//!
//! Transforms are synchronous and may take seconds. They run on tokio's
//! blocking pool, gated by a semaphore so that no more than `width` are in
//! flight at once.

use crate::{Result, TransformError};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs blocking closures on the blocking pool, at most `width` at a time
#[derive(Debug, Clone)]
pub struct BlockingWorker {
    permits: Arc<Semaphore>,
    width: usize,
}

impl BlockingWorker {
    /// Creates a worker; a `width` of zero is treated as one
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            permits: Arc::new(Semaphore::new(width)),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of tasks that could start right now
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a free slot, runs `task` on the blocking pool and returns
    /// its result
    ///
    /// A task that panics or is cancelled surfaces as a [`TransformError`].
    pub async fn run<T, F>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| TransformError::new("Blocking worker is closed"))?;

        let handle = tokio::task::spawn_blocking(move || {
            // Held until the task finishes, including on unwind
            let _permit = permit;
            task()
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                let message = if e.is_panic() {
                    "Transform task panicked"
                } else {
                    "Transform task was cancelled"
                };
                tracing::error!("{}: {}", message, e);
                Err(TransformError::new(message).with_source(e).into())
            }
        }
    }
}
