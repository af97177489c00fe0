//! Artifact download job.
//!
//! One `ArtifactDownload` per discovered link: GET the URL into
//! `<out_dir>/<version>/<kind>.jar`, skipping files that already exist.

mod single;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::control::CancelToken;
use crate::job::{Job, JobOutcome};
use crate::retry::{ErrorKind, JobError};
use crate::storage::{temp_path, PartFile};
use crate::url_model::sanitize_path_component;

/// Which jar a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    Client,
    Server,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Client => "client",
            ArtifactKind::Server => "server",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.jar", self.as_str())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered download link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub version: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    /// `<out_dir>/<version>/<kind>.jar`, with the version sanitized into one path component.
    pub fn target_path(&self, out_dir: &Path) -> PathBuf {
        let version = sanitize_path_component(&self.version);
        let version = if version.is_empty() {
            "unknown".to_string()
        } else {
            version
        };
        out_dir.join(version).join(self.kind.file_name())
    }
}

/// Timeouts applied to every transfer.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Bytes per second below which a transfer counts as stalled.
    pub low_speed_limit: u32,
    /// How long a transfer may stay stalled before it is aborted.
    pub low_speed_time: Duration,
    /// Hard cap for one transfer.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        }
    }
}

/// Downloads one artifact; implements `Job` for the worker pool.
#[derive(Debug, Clone)]
pub struct ArtifactDownload {
    artifact: Artifact,
    out_dir: PathBuf,
    curl: CurlOptions,
}

impl ArtifactDownload {
    pub fn new(artifact: Artifact, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact,
            out_dir: out_dir.into(),
            curl: CurlOptions::default(),
        }
    }

    pub fn with_curl_options(mut self, curl: CurlOptions) -> Self {
        self.curl = curl;
        self
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn target_path(&self) -> PathBuf {
        self.artifact.target_path(&self.out_dir)
    }
}

/// Turns discovered artifacts into download jobs, one per target file.
///
/// Artifacts that map to a target already claimed by an earlier one (repeated
/// links, version ids that sanitize to the same directory) are dropped. Temp
/// files left behind by an interrupted run are removed. Call before any job
/// starts.
pub fn plan_downloads(artifacts: Vec<Artifact>, out_dir: &Path) -> Vec<ArtifactDownload> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let job = ArtifactDownload::new(artifact, out_dir);
        let target = job.target_path();
        if !seen.insert(target.clone()) {
            tracing::debug!(url = %job.artifact.url, "duplicate target {}, dropping", target.display());
            continue;
        }
        let stale = temp_path(&target);
        match fs::remove_file(&stale) {
            Ok(()) => tracing::info!("removed leftover {}", stale.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not remove leftover {}: {}", stale.display(), e),
        }
        jobs.push(job);
    }
    jobs
}

fn storage_error(e: impl Into<anyhow::Error>) -> JobError {
    JobError::failed(ErrorKind::Storage, e)
}

impl Job for ArtifactDownload {
    fn execute(&self, cancel: &CancelToken) -> Result<JobOutcome, JobError> {
        let target = self.target_path();
        if target.exists() {
            tracing::info!("skipping file {}", target.display());
            return Ok(JobOutcome::Skipped);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                storage_error(anyhow::Error::new(e).context(format!("creating {}", parent.display())))
            })?;
        }

        let mut part = match PartFile::create(&target) {
            Ok(part) => part,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::info!("{} is already being downloaded, skipping", target.display());
                return Ok(JobOutcome::Skipped);
            }
            Err(e) => {
                return Err(storage_error(anyhow::Error::new(e).context(format!(
                    "creating {}",
                    temp_path(&target).display()
                ))))
            }
        };
        if let Err(e) = single::download_to(&self.artifact.url, &mut part, cancel, &self.curl) {
            part.discard();
            return Err(e);
        }
        let bytes = part.finalize(&target).map_err(storage_error)?;
        tracing::debug!(path = %target.display(), bytes, "downloaded");
        Ok(JobOutcome::Completed { bytes })
    }

    fn describe(&self) -> String {
        format!("{} {}", self.artifact.version, self.artifact.kind)
    }
}
