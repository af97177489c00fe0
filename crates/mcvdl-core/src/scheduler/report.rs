//! Periodic stats reporter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use super::progress::{ProgressCounters, ProgressStats};

/// Background task that logs a stats record every `interval`.
/// Stop it with `stop` once the run is over; dropping the handle leaves it running.
pub struct ReporterHandle {
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Aborts the task and waits for it to wind down.
    pub async fn stop(self) {
        self.task.abort();
        let _ = self.task.await;
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Spawns the reporter. Must be called from inside a tokio runtime.
pub fn spawn_reporter(
    counters: Arc<ProgressCounters>,
    started: Instant,
    interval: Duration,
) -> ReporterHandle {
    let interval = interval.max(Duration::from_millis(10));
    let task = tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let stats = counters.snapshot(started.elapsed().as_secs_f64());
            log_stats(&stats);
        }
    });
    ReporterHandle { task }
}

/// One periodic stats record.
pub fn log_stats(stats: &ProgressStats) {
    tracing::info!(
        items_completed = stats.items_completed,
        total_bytes = stats.total_bytes,
        avg_rate = format!("{:.0}", stats.avg_rate()),
        "stats"
    );
}

/// The summary record logged once at the end of a run.
pub fn log_final_stats(stats: &ProgressStats) {
    tracing::info!(
        items_completed = stats.items_completed,
        total_bytes = stats.total_bytes,
        dur = stats.elapsed_secs,
        avg_rate = stats.avg_rate(),
        "final stats"
    );
}
