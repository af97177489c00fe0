//! Disk side of a download: write into `<target>.part`, rename into place when done.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `client.jar` → `client.jar.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one download.
pub struct PartFile {
    file: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create the temp file for `final_path`.
    ///
    /// Fails with `AlreadyExists` if another download already owns it.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        Ok(PartFile {
            file: BufWriter::new(file),
            temp_path,
            written: 0,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, fsync and rename the temp file to `final_path`. Returns the byte count.
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> Result<u64> {
        let temp_path = self.temp_path.clone();
        let result = self.commit(final_path);
        if result.is_err() {
            remove_temp(&temp_path);
        }
        result
    }

    fn commit(self, final_path: &Path) -> Result<u64> {
        let written = self.written;
        let file = self
            .file
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("failed to flush {}", self.temp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to sync {}", self.temp_path.display()))?;
        drop(file);
        std::fs::rename(&self.temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                self.temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(written)
    }

    /// Drop the temp file (failed or cancelled download).
    pub fn discard(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        remove_temp(&temp_path);
    }
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        tracing::debug!(path = %temp_path.display(), "could not remove temp file: {}", e);
    }
}
