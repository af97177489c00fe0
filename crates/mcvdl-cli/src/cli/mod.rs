//! CLI for the mcvdl jar downloader.

mod interrupt;
mod run;

pub use interrupt::install as install_interrupt_handler;

use anyhow::Result;
use clap::Parser;
use mcvdl_core::config::{self, McvConfig};
use mcvdl_core::scheduler::FailurePolicy;
use mcvdl_core::shutdown::Interrupts;
use std::path::PathBuf;

/// Download every client and server jar listed on the version listing page.
#[derive(Debug, Parser)]
#[command(name = "mcvdl")]
#[command(about = "mcvdl: concurrent Minecraft client/server jar downloader", long_about = None)]
pub struct Cli {
    /// Number of concurrent downloads (config default: 10).
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Directory the jars are written to (config default: Downloads).
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Log debug details.
    #[arg(short, long)]
    pub verbose: bool,

    /// Listing page to crawl for download links.
    #[arg(long, value_name = "URL")]
    pub listing_url: Option<String>,

    /// Log and skip downloads that keep failing instead of stopping the run.
    #[arg(long)]
    pub keep_going: bool,

    /// Give up on a download after N attempts.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Ignore the config file and use built-in defaults.
    #[arg(long)]
    pub no_config: bool,
}

impl Cli {
    /// Config file (or defaults with `--no-config`) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<McvConfig> {
        let mut cfg = if self.no_config {
            McvConfig::default()
        } else {
            config::load_or_init()?
        };
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    fn apply_overrides(&self, cfg: &mut McvConfig) {
        if let Some(concurrency) = self.concurrency {
            cfg.concurrency = concurrency;
        }
        if let Some(dir) = &self.out_dir {
            cfg.out_dir = dir.clone();
        }
        if let Some(url) = &self.listing_url {
            cfg.listing_url = url.clone();
        }
        if self.keep_going {
            cfg.on_job_failure = FailurePolicy::SkipAndContinue;
        }
        if let Some(n) = self.max_attempts {
            let mut retry = cfg.retry.clone().unwrap_or_default();
            retry.max_attempts = Some(n);
            cfg.retry = Some(retry);
        }
    }

    /// Runs the crawl fed by `interrupts`; returns the process exit code.
    pub async fn run(self, interrupts: Interrupts) -> Result<i32> {
        let cfg = self.resolve_config()?;
        tracing::debug!("loaded config: {:?}", cfg);
        run::run_crawl(&cfg, interrupts).await
    }
}

#[cfg(test)]
mod tests;
