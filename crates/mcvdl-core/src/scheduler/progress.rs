//! Progress accounting shared by the workers and the stats reporter.
//!
//! Workers bump the counters after a verified success; the reporter reads
//! them and computes rate = total_bytes / elapsed_secs.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters, shared as `Arc<ProgressCounters>`.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    bytes: AtomicU64,
    completed: AtomicU64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bytes(&self, n: u64) {
        self.bytes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_completed(&self, n: u64) {
        self.completed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn items_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Read both counters plus the time since `elapsed_secs` started.
    pub fn snapshot(&self, elapsed_secs: f64) -> ProgressStats {
        ProgressStats {
            items_completed: self.items_completed(),
            total_bytes: self.total_bytes(),
            elapsed_secs,
        }
    }
}

/// Point-in-time view of the counters (what a stats record carries).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStats {
    /// Jobs that finished with a download.
    pub items_completed: u64,
    /// Bytes written by those jobs.
    pub total_bytes: u64,
    /// Seconds since the run started.
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Average rate in bytes per second (0 if elapsed is 0).
    pub fn avg_rate(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.elapsed_secs
    }
}
