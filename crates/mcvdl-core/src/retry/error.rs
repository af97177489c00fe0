//! Error types returned by jobs and by the retry loop.

use super::policy::ErrorKind;

/// Error returned by a single job attempt.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The attempt failed; `kind` decides whether it is worth retrying.
    #[error("{error:#}")]
    Failed { kind: ErrorKind, error: anyhow::Error },
    /// The job noticed the cancel token and stopped early.
    #[error("job cancelled")]
    Cancelled,
}

impl JobError {
    pub fn failed(kind: ErrorKind, error: impl Into<anyhow::Error>) -> Self {
        JobError::Failed {
            kind,
            error: error.into(),
        }
    }

    /// A failure worth retrying (treated like a dropped connection).
    pub fn transient(error: impl Into<anyhow::Error>) -> Self {
        Self::failed(ErrorKind::Connection, error)
    }

    /// A failure that retrying will not fix.
    pub fn permanent(error: impl Into<anyhow::Error>) -> Self {
        Self::failed(ErrorKind::Other, error)
    }

    /// Retry classification. `Cancelled` maps to `Other` (never retried).
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Failed { kind, .. } => *kind,
            JobError::Cancelled => ErrorKind::Other,
        }
    }
}

/// Why `run_with_retry` stopped without a success.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The error was not retryable, or the attempt/elapsed cap was hit.
    #[error("gave up after {attempts} attempt(s): {last}")]
    GaveUp { attempts: u32, last: JobError },
    /// Shutdown interrupted the job or its backoff.
    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled {
        attempts: u32,
        last: Option<JobError>,
    },
}

impl RetryError {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::GaveUp { attempts, .. } | RetryError::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}
