//! The unit of work the pool dispatches.

use crate::control::CancelToken;
use crate::retry::JobError;

/// What a successful execution produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Work was done; `bytes` were transferred.
    Completed { bytes: u64 },
    /// Nothing to do (e.g. the output already exists). Not counted as progress.
    Skipped,
}

/// A single fallible, cancellable operation.
///
/// `execute` runs on a blocking thread and may be called again after a
/// retryable failure, so it must be safe to repeat. Long-running jobs should
/// poll `cancel` and return `JobError::Cancelled` when asked to stop.
pub trait Job: Send + Sync {
    fn execute(&self, cancel: &CancelToken) -> Result<JobOutcome, JobError>;

    /// Short human-readable label used in log records.
    fn describe(&self) -> String {
        "job".to_string()
    }
}
