//! Bounded worker pool for blocking inference jobs
//!
//! Every pipeline call holds a queue slot from admission until the job
//! finishes and a worker permit while it runs. When no queue slot is free the
//! call is rejected instead of piling up behind the device.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::InferenceConfig;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct InferencePool {
    queue: Arc<Semaphore>,
    workers: Arc<Semaphore>,
    queue_capacity: usize,
    job_timeout: Option<Duration>,
}

impl InferencePool {
    pub fn new(config: &InferenceConfig) -> Self {
        let timeout = (config.job_timeout_secs > 0).then(|| Duration::from_secs(config.job_timeout_secs));
        Self::with_limits(config.max_concurrent, config.max_queued, timeout)
    }

    pub fn with_limits(
        max_concurrent: usize,
        max_queued: usize,
        job_timeout: Option<Duration>,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        let queue_capacity = max_queued.max(max_concurrent);

        Self {
            queue: Arc::new(Semaphore::new(queue_capacity)),
            workers: Arc::new(Semaphore::new(max_concurrent)),
            queue_capacity,
            job_timeout,
        }
    }

    /// Jobs currently admitted (running or waiting for a worker)
    pub fn in_flight(&self) -> usize {
        self.queue_capacity - self.queue.available_permits()
    }

    /// Run a blocking job on a worker thread.
    ///
    /// Fails fast with [`Error::Overloaded`] when the queue is full and with
    /// [`Error::Timeout`] when the job outlives the configured limit.
    pub async fn run<F, T>(&self, label: &'static str, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = self.queue.clone().try_acquire_owned().map_err(|_| {
            warn!("Rejecting {} job: inference queue full", label);
            Error::Overloaded
        })?;

        let worker = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::InferenceError("Inference pool is closed".to_string()))?;

        debug!("Running {} job ({} in flight)", label, self.in_flight());

        // A timed-out job holds its permits until the thread returns
        let handle = tokio::task::spawn_blocking(move || {
            let _slot = slot;
            let _worker = worker;
            job()
        });

        let joined = match self.job_timeout {
            Some(limit) => tokio::time::timeout(limit, handle).await.map_err(|_| {
                warn!("{} job exceeded {:?}", label, limit);
                Error::Timeout(limit.as_secs())
            })?,
            None => handle.await,
        };

        joined.map_err(|e| Error::InferenceError(format!("{} job failed to complete: {}", label, e)))?
    }
}
