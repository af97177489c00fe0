//! Job dispatch engine.
//!
//! A closed job queue is drained by a fixed number of workers; each job runs
//! under the retry policy, successes feed the shared progress counters, and
//! the cancel signal stops the workers between jobs.

mod pool;
mod progress;
mod queue;
mod report;
mod worker;

pub use pool::{FailurePolicy, PoolError, PoolHandle, PoolReport, WorkerPool};
pub use progress::{ProgressCounters, ProgressStats};
pub use queue::{JobQueue, JobSender, QueueError};
pub use report::{log_final_stats, log_stats, spawn_reporter, ReporterHandle};
