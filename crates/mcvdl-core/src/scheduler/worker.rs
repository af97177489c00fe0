//! A single worker: drain the queue, one job at a time, each under the retry policy.

use std::sync::Arc;

use super::pool::{FailurePolicy, PoolError, PoolReport};
use super::progress::ProgressCounters;
use super::queue::JobQueue;
use crate::control::CancelSignal;
use crate::job::JobOutcome;
use crate::retry::{run_with_retry, JobError, RetryPolicy};

/// State shared by every worker of one pool.
pub(super) struct WorkerContext {
    pub(super) queue: JobQueue,
    pub(super) signal: CancelSignal,
    pub(super) counters: Arc<ProgressCounters>,
    pub(super) retry: RetryPolicy,
    pub(super) on_failure: FailurePolicy,
}

/// Runs until the queue is exhausted or shutdown is requested.
///
/// A job dequeued before a soft cancel is still attempted; nothing is
/// dequeued after one. Under `FailFast`, a job that exhausts its retries ends
/// the worker with `PoolError::JobFailed`.
pub(super) async fn run_worker(id: usize, ctx: Arc<WorkerContext>) -> Result<PoolReport, PoolError> {
    let mut report = PoolReport::default();
    let mut token = ctx.signal.token();

    loop {
        if token.is_cancelled() {
            report.interrupted = true;
            break;
        }
        let next = tokio::select! {
            job = ctx.queue.next() => job,
            _ = token.cancelled() => {
                report.interrupted = true;
                break;
            }
        };
        let Some(job) = next else {
            tracing::debug!(worker = id, "queue exhausted");
            break;
        };
        if token.is_hard_exit() {
            report.interrupted = true;
            break;
        }

        let label = job.describe();
        let result = run_with_retry(&ctx.retry, &token, |attempt| {
            let job = Arc::clone(&job);
            let token = token.clone();
            async move {
                if attempt > 1 {
                    tracing::debug!(worker = id, attempt, "retrying job");
                }
                match tokio::task::spawn_blocking(move || job.execute(&token)).await {
                    Ok(res) => res,
                    Err(e) => Err(JobError::permanent(anyhow::anyhow!("job panicked: {}", e))),
                }
            }
        })
        .await;

        match result {
            Ok(JobOutcome::Completed { bytes }) => {
                ctx.counters.add_bytes(bytes);
                ctx.counters.add_completed(1);
                report.completed += 1;
                tracing::debug!(worker = id, job = %label, bytes, "job completed");
            }
            Ok(JobOutcome::Skipped) => {
                report.skipped += 1;
                tracing::debug!(worker = id, job = %label, "job skipped");
            }
            Err(e) if e.is_cancelled() => {
                report.cancelled += 1;
                report.interrupted = true;
                tracing::info!(worker = id, job = %label, "job interrupted by shutdown");
                break;
            }
            Err(e) => match ctx.on_failure {
                FailurePolicy::FailFast => {
                    return Err(PoolError::JobFailed {
                        job: label,
                        source: e,
                    });
                }
                FailurePolicy::SkipAndContinue => {
                    report.failed += 1;
                    tracing::error!(worker = id, job = %label, error = %e, "job failed, continuing");
                }
            },
        }
    }

    Ok(report)
}
