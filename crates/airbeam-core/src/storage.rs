// ── Local recording store ──
//
// Size accounting and oldest-first eviction for one device's storage
// directory. Retained files carry a `{device}_{unix_ts}_` prefix, so the
// lexicographically smallest name is the oldest download.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of files the quota is allowed to evict.
pub const RECORDING_EXTENSION: &str = ".mov";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Result of one quota enforcement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaReport {
    /// Files removed, oldest first.
    pub evicted: Vec<PathBuf>,
    /// Directory size after enforcement, in whole MB.
    pub size_mb: u64,
    /// Still over budget with nothing left to evict.
    pub exhausted: bool,
}

/// A device's local storage directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub fn ensure_exists(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Total size of every regular file below the root, in bytes.
    /// A missing directory is empty.
    pub fn size_bytes(&self) -> io::Result<u64> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut total = 0u64;
        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            if entry.file_type().is_file() {
                total = total.saturating_add(entry.metadata()?.len());
            }
        }
        Ok(total)
    }

    /// Total size in whole megabytes, rounded down.
    pub fn size_mb(&self) -> io::Result<u64> {
        Ok(self.size_bytes()? / BYTES_PER_MB)
    }

    /// Remove the oldest recording in the root directory.
    ///
    /// Returns the removed path, or `None` when there is nothing to evict.
    pub fn evict_oldest(&self) -> io::Result<Option<PathBuf>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(RECORDING_EXTENSION) {
                    names.push(name.to_owned());
                }
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        let Some(oldest) = names.pop() else {
            return Ok(None);
        };

        let path = self.root.join(oldest);
        std::fs::remove_file(&path)?;
        info!(path = %path.display(), "exceeded directory size limit, deleted old file");
        Ok(Some(path))
    }

    /// Evict oldest recordings until the directory fits in `max_mb`.
    ///
    /// Waits `pause` after each eviction before measuring again. Stops early
    /// when the directory is still too large but holds no more recordings.
    pub async fn enforce_quota(&self, max_mb: u64, pause: Duration) -> io::Result<QuotaReport> {
        let mut report = QuotaReport {
            size_mb: self.size_mb()?,
            ..QuotaReport::default()
        };

        while report.size_mb > max_mb {
            debug!(
                path = %self.root.display(),
                size_mb = report.size_mb,
                max_mb,
                "storage directory over quota"
            );

            let Some(evicted) = self.evict_oldest()? else {
                warn!(
                    path = %self.root.display(),
                    size_mb = report.size_mb,
                    max_mb,
                    "storage over quota but no recordings left to evict"
                );
                report.exhausted = true;
                break;
            };
            report.evicted.push(evicted);

            tokio::time::sleep(pause).await;
            report.size_mb = self.size_mb()?;
        }

        Ok(report)
    }
}
