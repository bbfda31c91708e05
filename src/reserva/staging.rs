//! Temporary on-disk copies of generated contracts.
//!
//! Each staged file gets a unique name under the staging directory and is
//! removed by a delayed background task once the upload is done with it.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use tempfile::{Builder, NamedTempFile};
use tokio::task::JoinHandle;

pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_STAGING_DIR: &str = "tmp";

#[derive(Debug, Clone)]
pub struct ContractStaging {
    dir: PathBuf,
    cleanup_delay: Duration,
}

/// A staged contract. Dropping it deletes the file immediately, use
/// [`ContractStaging::schedule_removal`] to defer that.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl ContractStaging {
    pub fn new(dir: impl Into<PathBuf>, cleanup_delay: Duration) -> Self {
        Self {
            dir: dir.into(),
            cleanup_delay,
        }
    }

    /// Write `pdf` to `contrato-{id}-{millis}-<random>.pdf` in the staging
    /// directory, creating the directory if needed.
    pub fn stage(&self, reservation_id: i64, pdf: &[u8]) -> io::Result<StagedFile> {
        std::fs::create_dir_all(&self.dir)?;

        let prefix = format!(
            "contrato-{}-{}-",
            reservation_id,
            chrono::Utc::now().timestamp_millis()
        );
        let mut file = Builder::new()
            .prefix(&prefix)
            .suffix(".pdf")
            .tempfile_in(&self.dir)?;
        file.write_all(pdf)?;
        file.flush()?;

        debug!("Staged contract at {}", file.path().display());
        Ok(StagedFile { file })
    }

    /// Delete `staged` after the cleanup delay. Failures are logged.
    pub fn schedule_removal(&self, staged: StagedFile) -> JoinHandle<()> {
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let path = staged.path().to_path_buf();
            match staged.file.close() {
                Ok(()) => debug!("Removed staged contract {}", path.display()),
                Err(e) => warn!("Failed to delete temporary file {}: {}", path.display(), e),
            }
        })
    }
}

impl Default for ContractStaging {
    fn default() -> Self {
        Self::new(DEFAULT_STAGING_DIR, DEFAULT_CLEANUP_DELAY)
    }
}
