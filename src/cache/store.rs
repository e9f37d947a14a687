//! File-backed key/value store for page bodies

use crate::fetch::normalize_text;
use crate::{Result, TrawlError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Directory of cached page bodies, keyed by sanitized URL
///
/// The directory is created on first use. Reads and writes go straight to
/// disk; nothing is held in memory.
#[derive(Debug)]
pub struct PageCache {
    dir: PathBuf,
    dir_ready: AtomicBool,
}

impl PageCache {
    /// Creates a cache rooted at `dir` without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            dir_ready: AtomicBool::new(false),
        }
    }

    /// Root directory of the cache
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Returns true iff a blob is stored under `key`
    pub fn has(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        if let Err(e) = self.ensure_dir() {
            tracing::debug!("Cache directory unavailable: {}", e);
            return false;
        }
        self.path_for(key).is_file()
    }

    /// Reads the blob stored under `key` as UTF-8 text
    ///
    /// Invalid byte sequences are replaced with U+FFFD. Fails with an
    /// `io::ErrorKind::NotFound` cache error if nothing is stored.
    pub fn read(&self, key: &str) -> Result<String> {
        let path = self.checked_path(key)?;
        self.ensure_dir()?;

        let bytes = std::fs::read(&path).map_err(|source| TrawlError::Cache { path, source })?;
        Ok(normalize_text(&bytes).into_owned())
    }

    /// Stores `content` under `key`, replacing any previous blob
    pub fn write(&self, key: &str, content: &str) -> Result<()> {
        let path = self.checked_path(key)?;
        self.ensure_dir()?;

        std::fs::write(&path, content.as_bytes())
            .map_err(|source| TrawlError::Cache { path, source })
    }

    fn checked_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(TrawlError::Cache {
                path: self.dir.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty cache key"),
            });
        }
        Ok(self.path_for(key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| TrawlError::Cache {
            path: self.dir.clone(),
            source,
        })?;
        self.dir_ready.store(true, Ordering::Release);
        Ok(())
    }
}
