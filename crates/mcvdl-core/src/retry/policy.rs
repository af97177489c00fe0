use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// This intentionally stays generic; callers map HTTP status codes, curl
/// errors, or IO failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Local disk failure (permission denied, disk full). Not retried.
    Storage,
    /// Any other error (not retried).
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Throttled | ErrorKind::Http5xx(_)
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: `initial_interval * multiplier^(attempt-1)`, capped at
/// `max_interval`, until `max_attempts` or `max_elapsed` runs out.
///
/// `None` for both caps retries forever (until cancelled).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay after the first failure.
    pub initial_interval: Duration,
    /// Growth factor per failure; values below 1.0 are treated as 1.0.
    pub multiplier: f64,
    /// Upper bound on a single backoff delay.
    pub max_interval: Duration,
    /// Stop once the next retry would start after this much time since the first attempt.
    pub max_elapsed: Option<Duration>,
    /// Maximum number of attempts (including the first).
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            max_elapsed: Some(Duration::from_secs(15 * 60)),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Retry forever on retryable errors; only cancellation ends the loop.
    pub fn unbounded() -> Self {
        Self {
            max_elapsed: None,
            max_attempts: None,
            ..Self::default()
        }
    }

    /// Backoff delay after the `attempt`-th failure (1-based).
    pub fn interval(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(64) as i32;
        let raw = self.initial_interval.as_secs_f64() * self.multiplier.max(1.0).powi(exp);
        Duration::try_from_secs_f64(raw)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }

    /// Decide what to do after attempt number `attempt` (1-based) failed with
    /// `kind`, `elapsed` after the first attempt started.
    pub fn decide(&self, attempt: u32, elapsed: Duration, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return RetryDecision::NoRetry;
        }
        let delay = self.interval(attempt);
        if self
            .max_elapsed
            .is_some_and(|max| elapsed.saturating_add(delay) > max)
        {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(delay)
    }
}
