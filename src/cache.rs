//! Persistent response cache with per-entry expiry.
//!
//! Entries live one-per-file under the cache directory as
//! `<namespace>_<key>.json` with body `{ "data": …, "timestamp": …,
//! "expiry": … }` — `timestamp` is the creation instant in epoch
//! milliseconds and `expiry` a duration in milliseconds. An entry is
//! valid iff `now − timestamp < expiry`; expired or unparsable entries
//! are deleted on the next read. There is no eviction beyond TTL.

use crate::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cache time for weather lookups.
pub const WEATHER_CACHE_TIME_MS: u64 = 15 * 60 * 1000;
/// Cache time for proactive and weather alerts.
pub const ALERTS_CACHE_TIME_MS: u64 = 30 * 60 * 1000;
/// Cache time for the government scheme list.
pub const SCHEMES_CACHE_TIME_MS: u64 = 24 * 60 * 60 * 1000;

/// On-disk entry format.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    data: serde_json::Value,
    /// Creation instant, epoch milliseconds.
    timestamp: i64,
    /// Time-to-live in milliseconds.
    expiry: u64,
}

/// File-backed TTL cache for advisory responses.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    /// Open a cache rooted at the default cache directory.
    pub fn open_default() -> Self {
        Self::open(crate::app_dirs::cache_dir())
    }

    /// Open a cache rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Look up a cached value.
    ///
    /// Returns `None` for missing, malformed, or expired entries; expired
    /// and malformed entries are removed as a side effect.
    pub fn get(&self, namespace: &str, key: &str) -> Option<serde_json::Value> {
        self.get_at(namespace, key, chrono::Utc::now().timestamp_millis())
    }

    fn get_at(&self, namespace: &str, key: &str, now_ms: i64) -> Option<serde_json::Value> {
        let path = self.entry_path(namespace, key);
        let raw = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("discarding unparsable cache entry {}: {e}", path.display());
                remove_entry(&path);
                return None;
            }
        };

        if now_ms.saturating_sub(entry.timestamp) >= entry.expiry as i64 {
            debug!("cache entry expired: {}", path.display());
            remove_entry(&path);
            return None;
        }

        Some(entry.data)
    }

    /// Store a value with the given time-to-live.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or written.
    pub fn set(
        &self,
        namespace: &str,
        key: &str,
        data: serde_json::Value,
        ttl_ms: u64,
    ) -> Result<()> {
        let entry = CacheEntry {
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
            expiry: ttl_ms,
        };
        let body = serde_json::to_string(&entry)
            .map_err(|e| AdvisoryError::Cache(format!("failed to serialize entry: {e}")))?;

        std::fs::create_dir_all(&self.root)
            .map_err(|e| AdvisoryError::Cache(format!("failed to create cache dir: {e}")))?;
        let path = self.entry_path(namespace, key);
        std::fs::write(&path, body)
            .map_err(|e| AdvisoryError::Cache(format!("failed to write {}: {e}", path.display())))
    }

    /// Path for a namespaced key: `<root>/<namespace>_<key>.json`.
    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.root
            .join(format!("{namespace}_{}.json", sanitize_key(key)))
    }
}

/// Replace filesystem-hostile characters so request parameters (location,
/// language) can be embedded in filenames.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn remove_entry(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!("failed to remove cache entry {}: {e}", path.display());
    }
}
