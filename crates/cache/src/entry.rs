//! Stored entries and their freshness rules.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A single cached value with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// Snapshot of the stored value.
    pub value: serde_json::Value,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry computed at write time.
    pub expires_at: DateTime<Utc>,
    /// Successful reads since the write.
    pub access_count: u64,
    /// File whose modification invalidates the entry.
    pub file_path: Option<PathBuf>,
    /// Modification time of `file_path` when the entry was written.
    pub file_mtime: Option<DateTime<Utc>>,
    /// Write order, used for oldest-written eviction.
    #[serde(skip)]
    pub(crate) sequence: u64,
}

impl CacheEntry {
    /// Whether the entry is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether `file` changed since the entry was written.
    ///
    /// A file that appeared or disappeared counts as changed.
    #[must_use]
    pub fn is_stale_for(&self, file: &Path) -> bool {
        match (self.file_mtime, file_mtime(file)) {
            (Some(recorded), Some(current)) => current > recorded,
            (None, None) => false,
            _ => true,
        }
    }

    /// Whether the entry's own watched file changed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.file_path
            .as_deref()
            .is_some_and(|file| self.is_stale_for(file))
    }
}

/// Reads a file's modification time, `None` if it cannot be read.
#[must_use]
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified());
    match modified {
        Ok(time) => Some(DateTime::<Utc>::from(time)),
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "No modification time");
            None
        }
    }
}
