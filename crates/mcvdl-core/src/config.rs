use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::listing::DEFAULT_LISTING_URL;
use crate::retry::RetryPolicy;
use crate::scheduler::FailurePolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay in seconds after the first failure (e.g. 0.5 = 500ms).
    pub initial_delay_secs: f64,
    /// Backoff growth factor per failure.
    pub multiplier: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Give up once this many seconds have passed since the first attempt
    /// (missing = no time limit).
    #[serde(default)]
    pub max_elapsed_secs: Option<u64>,
    /// Maximum number of attempts per job (including the first).
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 0.5,
            multiplier: 1.5,
            max_delay_secs: 60,
            max_elapsed_secs: Some(15 * 60),
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let initial = if self.initial_delay_secs.is_finite() && self.initial_delay_secs >= 0.0 {
            Duration::from_secs_f64(self.initial_delay_secs.min(86_400.0))
        } else {
            RetryPolicy::default().initial_interval
        };
        RetryPolicy {
            initial_interval: initial,
            multiplier: self.multiplier,
            max_interval: Duration::from_secs(self.max_delay_secs),
            max_elapsed: self.max_elapsed_secs.map(Duration::from_secs),
            max_attempts: self.max_attempts,
        }
    }
}

/// Startup validation failures, reported before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for --concurrency: must be at least 1")]
    InvalidConcurrency,
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Global configuration loaded from `~/.config/mcvdl/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McvConfig {
    /// Number of concurrent downloads.
    pub concurrency: usize,
    /// Output directory; artifacts land in `<out_dir>/<version>/<kind>.jar`.
    pub out_dir: PathBuf,
    /// Listing page that links to every artifact.
    pub listing_url: String,
    /// Seconds between periodic stats records.
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    /// What to do when a download still fails after retrying.
    #[serde(default)]
    pub on_job_failure: FailurePolicy,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_report_interval_secs() -> u64 {
    1
}

impl Default for McvConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            out_dir: PathBuf::from("Downloads"),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            report_interval_secs: default_report_interval_secs(),
            on_job_failure: FailurePolicy::FailFast,
            retry: None,
        }
    }
}

impl McvConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }

    pub fn worker_count(&self) -> Result<NonZeroUsize, ConfigError> {
        validate_concurrency(self.concurrency)
    }
}

/// Worker count must be positive.
pub fn validate_concurrency(concurrency: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(concurrency).ok_or(ConfigError::InvalidConcurrency)
}

/// Create the output directory (and parents) if needed.
pub fn prepare_out_dir(dir: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(dir).map_err(|source| ConfigError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mcvdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<McvConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init`, at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<McvConfig> {
    if !path.exists() {
        let default_cfg = McvConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: McvConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = McvConfig::default();
        assert_eq!(cfg.concurrency, 10);
        assert_eq!(cfg.out_dir, PathBuf::from("Downloads"));
        assert_eq!(cfg.listing_url, "https://mcversions.net/");
        assert_eq!(cfg.on_job_failure, FailurePolicy::FailFast);
        assert_eq!(cfg.report_interval(), Duration::from_secs(1));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = McvConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: McvConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            concurrency = 4
            out_dir = "/srv/jars"
            listing_url = "http://127.0.0.1:8080/"
            on_job_failure = "skip-and-continue"

            [retry]
            initial_delay_secs = 0.25
            multiplier = 2.0
            max_delay_secs = 10
            max_attempts = 6
        "#;
        let cfg: McvConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.out_dir, PathBuf::from("/srv/jars"));
        assert_eq!(cfg.report_interval_secs, 1);
        assert_eq!(cfg.on_job_failure, FailurePolicy::SkipAndContinue);

        let policy = cfg.retry_policy();
        assert_eq!(policy.initial_interval, Duration::from_millis(250));
        assert_eq!(policy.max_interval, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, Some(6));
        assert!(policy.max_elapsed.is_none());
    }

    #[test]
    fn missing_retry_section_uses_default_policy() {
        let cfg = McvConfig::default();
        let policy = cfg.retry_policy();
        let expected = RetryConfig::default().to_policy();
        assert_eq!(policy.initial_interval, expected.initial_interval);
        assert_eq!(policy.max_elapsed, expected.max_elapsed);
        assert_eq!(policy.max_attempts, None);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(matches!(
            validate_concurrency(0),
            Err(ConfigError::InvalidConcurrency)
        ));
        assert_eq!(validate_concurrency(3).unwrap().get(), 3);
    }

    #[test]
    fn load_or_init_writes_defaults_then_reads_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn prepare_out_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        prepare_out_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn prepare_out_dir_fails_on_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            prepare_out_dir(&file),
            Err(ConfigError::OutputDir { .. })
        ));
    }
}
