//! Retry loop: run an attempt until success, give-up, or hard exit.

use std::future::Future;

use tokio::time::Instant;

use super::error::{JobError, RetryError};
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::CancelToken;

/// Runs `attempt_fn` until it succeeds or the retry policy says to stop.
///
/// `attempt_fn` receives the 1-based attempt number. On a retryable failure
/// the error is logged and the loop sleeps for the backoff delay; a hard exit
/// on `cancel` cuts the sleep short and returns `RetryError::Cancelled` with
/// the last error. Soft cancellation does not stop retrying.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut attempt_fn: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, JobError>>,
{
    let started = Instant::now();
    let mut waiter = cancel.clone();
    let mut attempt = 1u32;
    loop {
        let err = match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(JobError::Cancelled) => {
                return Err(RetryError::Cancelled {
                    attempts: attempt,
                    last: None,
                })
            }
            Err(e) => e,
        };

        let delay = match policy.decide(attempt, started.elapsed(), err.kind()) {
            RetryDecision::NoRetry => {
                return Err(RetryError::GaveUp {
                    attempts: attempt,
                    last: err,
                })
            }
            RetryDecision::RetryAfter(d) => d,
        };

        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "attempt failed, retrying"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = waiter.hard_exit() => {}
        }
        if cancel.is_hard_exit() {
            return Err(RetryError::Cancelled {
                attempts: attempt,
                last: Some(err),
            });
        }
        attempt += 1;
    }
}
