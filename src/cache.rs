//! Time-bounded cache of the rendered post list.
//!
//! The feed is fetched through a public proxy that is slow and rate
//! limited, so a successful fetch is remembered for a fixed window
//! (30 minutes by default) and replayed on later page loads.
//!
//! # Design
//!
//! Storage is abstracted as a string key-value store ([`KeyValueStore`]),
//! the shape of the browser's `localStorage`. One key holds one serialized
//! [`CacheEntry`]:
//!
//! ```json
//! {"posts": [{"title": "...", "link": "...", "date": "...", "excerpt": "..."}],
//!  "timestamp": 1704468600000}
//! ```
//!
//! `timestamp` is epoch milliseconds, the same value `Date.now()` produces,
//! so entries written by either side of the site stay readable.
//!
//! ## Failure handling
//!
//! The cache can only make a page load faster, never break it:
//!
//! - a missing, unparseable, or stale entry reads as a miss;
//! - a store that fails to read reads as a miss;
//! - a store that rejects a write (e.g. quota exceeded) is logged and ignored.
//!
//! Entries are never edited in place or deleted; a stale one is simply
//! overwritten by the next successful fetch.

use crate::types::FeedPost;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Storage failure: a read or write against the key-value store went wrong.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String key-value persistence, modeled on `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store with an optional total size limit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would make keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Number of accepted writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn used_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Directory-backed store: each key is a `<key>.json` file.
///
/// Used by the host binary so repeated runs share one cache.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

/// The stored record: the post list and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub posts: Vec<FeedPost>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Whether the entry is younger than `window` at `now`.
    ///
    /// A timestamp so far off that the age cannot be computed is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let Some(age_ms) = now.timestamp_millis().checked_sub(self.timestamp) else {
            return false;
        };
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        age_ms < window_ms
    }
}

/// The feed's cache slot in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct FeedCache {
    key: String,
    window: Duration,
}

impl FeedCache {
    pub fn new(key: impl Into<String>, window: Duration) -> Self {
        Self {
            key: key.into(),
            window,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Posts from a fresh entry, or `None` on any kind of miss.
    pub fn read(&self, store: &impl KeyValueStore, now: DateTime<Utc>) -> Option<Vec<FeedPost>> {
        let raw = match store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "cache read error");
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "cache read error");
                return None;
            }
        };
        if !entry.is_fresh(now, self.window) {
            tracing::debug!(key = %self.key, "cache entry stale");
            return None;
        }
        Some(entry.posts)
    }

    /// Replace the entry with `posts` stamped at `now`.
    ///
    /// Never fails; a rejected write is logged and reported as `false`.
    pub fn write(&self, store: &mut impl KeyValueStore, posts: &[FeedPost], now: DateTime<Utc>) -> bool {
        let entry = CacheEntry {
            posts: posts.to_vec(),
            timestamp: now.timestamp_millis(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| StorageError::Io(e.into()))
            .and_then(|json| store.set(&self.key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "cache write error");
                false
            }
        }
    }
}
