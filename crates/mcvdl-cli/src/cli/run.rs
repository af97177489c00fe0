//! `mcvdl` run: discover artifacts, download them through the worker pool, report.

use anyhow::{Context, Result};
use mcvdl_core::config::{self, McvConfig};
use mcvdl_core::control::CancelSignal;
use mcvdl_core::downloader;
use mcvdl_core::job::Job;
use mcvdl_core::listing;
use mcvdl_core::scheduler::{self, JobQueue, ProgressCounters, WorkerPool};
use mcvdl_core::shutdown::{Interrupts, ShutdownController, HARD_EXIT_CODE};
use std::sync::Arc;
use std::time::Instant;

/// Runs one crawl and returns the exit code. A second interrupt returns
/// `HARD_EXIT_CODE` right away without waiting for the workers.
pub async fn run_crawl(cfg: &McvConfig, interrupts: Interrupts) -> Result<i32> {
    let workers = cfg.worker_count()?;
    config::prepare_out_dir(&cfg.out_dir)?;
    tracing::info!(
        concurrency = workers.get(),
        out_dir = %cfg.out_dir.display(),
        listing = %cfg.listing_url,
        "mcvdl starting"
    );

    let signal = CancelSignal::new();
    let shutdown = ShutdownController::new(signal.clone(), interrupts).spawn();

    let listing_url = cfg.listing_url.clone();
    let discovery = tokio::task::spawn_blocking(move || listing::discover(&listing_url));
    let artifacts = tokio::select! {
        res = discovery => res.context("listing task failed")??,
        _ = shutdown.hard_exit_requested() => return Ok(HARD_EXIT_CODE),
    };

    let jobs: Vec<Arc<dyn Job>> = downloader::plan_downloads(artifacts, &cfg.out_dir)
        .into_iter()
        .map(|job| Arc::new(job) as Arc<dyn Job>)
        .collect();
    let queue = JobQueue::from_jobs(jobs)?;

    let counters = Arc::new(ProgressCounters::new());
    let started = Instant::now();
    let reporter = scheduler::spawn_reporter(Arc::clone(&counters), started, cfg.report_interval());

    let pool = WorkerPool::new(workers, Arc::clone(&counters))
        .retry_policy(cfg.retry_policy())
        .failure_policy(cfg.on_job_failure)
        .start(queue, &signal);

    let outcome = tokio::select! {
        res = pool.join() => res,
        _ = shutdown.hard_exit_requested() => return Ok(HARD_EXIT_CODE),
    };

    reporter.stop().await;
    let phase = shutdown.terminate();
    scheduler::log_final_stats(&counters.snapshot(started.elapsed().as_secs_f64()));

    let report = match outcome {
        Ok(report) => report,
        // Already logged by the pool.
        Err(_) => return Ok(1),
    };
    tracing::info!(
        completed = report.completed,
        skipped = report.skipped,
        failed = report.failed,
        interrupted = report.interrupted,
        phase = ?phase,
        "done"
    );
    if report.failed > 0 {
        tracing::warn!("{} download(s) failed and were skipped", report.failed);
        return Ok(1);
    }
    Ok(0)
}
