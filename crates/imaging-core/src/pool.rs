//! Bounded worker pool.
//!
//! At most `size` jobs run at once. Each admitted job runs on the blocking
//! thread pool, since the pipeline is synchronous file I/O, CPU work and a
//! subprocess wait.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::PipelineConfig;
use crate::extract::RawDecoder;
use crate::job::{process_job, Job, JobOutcome, JobResult};

/// A job could not be run by the pool.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("pool is closed")]
    Closed,

    #[error("worker failed: {0}")]
    Worker(String),
}

/// Handle to the pool. Cheap to clone; clones share the same permits.
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
    config: Arc<PipelineConfig>,
    decoder: Arc<dyn RawDecoder>,
}

impl WorkerPool {
    /// Create a pool running at most `size` jobs concurrently (minimum 1).
    pub fn new(size: usize, config: Arc<PipelineConfig>, decoder: Arc<dyn RawDecoder>) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            config,
            decoder,
        }
    }

    /// Pool size matching the machine's available parallelism.
    pub fn default_size() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `job`, waiting for a free worker first.
    pub async fn submit(&self, job: Job) -> Result<JobOutcome, DispatchError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DispatchError::Closed)?;

        let config = self.config.clone();
        let decoder = self.decoder.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            process_job(&job, &config, decoder.as_ref())
        })
        .await
        .map_err(|e| DispatchError::Worker(e.to_string()))?;

        Ok(outcome)
    }

    /// Like [`submit`](Self::submit), but a dispatch failure becomes a
    /// failed result for `job` instead of an error.
    pub async fn run(&self, job: Job) -> JobOutcome {
        let id = job.id;
        match self.submit(job).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(id, error = %e, "Failed to send work to pool");
                JobOutcome::new(JobResult::failure(
                    id,
                    format!("Failed to send work to pool: {e}"),
                ))
            }
        }
    }

    /// Stop admitting jobs. Jobs already running finish normally.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}
