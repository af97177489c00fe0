//! Fixed-size worker pool over a closed job queue.
//!
//! Spawns exactly `workers` tasks that share one `JobQueue`, one
//! `CancelSignal` and one set of `ProgressCounters`. `PoolHandle::join`
//! waits for all of them and merges their reports.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::progress::ProgressCounters;
use super::queue::JobQueue;
use super::worker::{run_worker, WorkerContext};
use crate::control::CancelSignal;
use crate::retry::{RetryError, RetryPolicy};

/// What the pool does when a job still fails after retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop every worker and fail the whole run.
    #[default]
    FailFast,
    /// Log the failure, count it, and keep draining the queue.
    SkipAndContinue,
}

/// Per-run totals, merged from every worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub completed: u64,
    pub skipped: u64,
    /// Jobs that gave up under `SkipAndContinue`.
    pub failed: u64,
    /// Jobs whose retry loop was ended by shutdown.
    pub cancelled: u64,
    /// At least one worker stopped because shutdown was requested.
    pub interrupted: bool,
}

impl PoolReport {
    fn merge(&mut self, other: PoolReport) {
        self.completed += other.completed;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.cancelled += other.cancelled;
        self.interrupted |= other.interrupted;
    }

    /// Jobs taken off the queue and attempted.
    pub fn attempted(&self) -> u64 {
        self.completed + self.skipped + self.failed + self.cancelled
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("{job}: {source}")]
    JobFailed {
        job: String,
        #[source]
        source: RetryError,
    },
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Pool configuration; `start` spawns the workers.
#[derive(Debug)]
pub struct WorkerPool {
    workers: NonZeroUsize,
    counters: Arc<ProgressCounters>,
    retry: RetryPolicy,
    on_failure: FailurePolicy,
}

impl WorkerPool {
    pub fn new(workers: NonZeroUsize, counters: Arc<ProgressCounters>) -> Self {
        Self {
            workers,
            counters,
            retry: RetryPolicy::default(),
            on_failure: FailurePolicy::default(),
        }
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn failure_policy(mut self, on_failure: FailurePolicy) -> Self {
        self.on_failure = on_failure;
        self
    }

    /// Spawns the workers. Must be called from inside a tokio runtime.
    pub fn start(self, queue: JobQueue, signal: &CancelSignal) -> PoolHandle {
        let workers = self.workers.get();
        let ctx = Arc::new(WorkerContext {
            queue,
            signal: signal.clone(),
            counters: self.counters,
            retry: self.retry,
            on_failure: self.on_failure,
        });
        let mut join_set = JoinSet::new();
        for id in 0..workers {
            join_set.spawn(run_worker(id, Arc::clone(&ctx)));
        }
        tracing::debug!(workers, "worker pool started");
        PoolHandle { join_set, workers }
    }
}

/// Running pool.
pub struct PoolHandle {
    join_set: JoinSet<Result<PoolReport, PoolError>>,
    workers: usize,
}

impl PoolHandle {
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Waits until every worker has stopped.
    ///
    /// On the first fatal failure the remaining workers are aborted (jobs
    /// already running on the blocking pool are left to finish unobserved)
    /// and the failure is returned.
    pub async fn join(mut self) -> Result<PoolReport, PoolError> {
        let mut report = PoolReport::default();
        while let Some(joined) = self.join_set.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(PoolError::Worker(e.to_string())),
            };
            match outcome {
                Ok(part) => report.merge(part),
                Err(e) => {
                    tracing::error!(error = %e, "fatal job failure, stopping all workers");
                    self.join_set.abort_all();
                    while self.join_set.join_next().await.is_some() {}
                    return Err(e);
                }
            }
        }
        tracing::debug!(
            completed = report.completed,
            skipped = report.skipped,
            failed = report.failed,
            interrupted = report.interrupted,
            "worker pool drained"
        );
        Ok(report)
    }
}
