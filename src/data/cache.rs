//! On-disk cache for fetched incidence payloads.
//!
//! Payloads are keyed by a deterministic string of (season, lag, as-of
//! epiweek) so that repeated scoring runs within the same week avoid
//! re-fetching. Concurrent writers to the same key are not synchronized;
//! callers running fetches from multiple processes own that serialization.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use crate::data::error::{DataError, DataResult};
use crate::time::{Epiweek, SeasonId};

/// Deterministic cache key for one fetched season payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub season: SeasonId,
    /// Reporting lag; `None` means the latest issue.
    pub lag: Option<u32>,
    /// Epiweek the fetch was issued in; keeps stale entries from earlier
    /// weeks distinguishable.
    pub as_of: Epiweek,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lag {
            Some(lag) => write!(f, "season-{}-lag-{}-asof-{}.json", self.season, lag, self.as_of),
            None => write!(f, "season-{}-lag-latest-asof-{}.json", self.season, self.as_of),
        }
    }
}

/// Byte-payload cache collaborator.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Tell if an entry is present for the key.
    async fn exists(&self, key: &str) -> DataResult<bool>;

    /// Read the payload stored under the key.
    async fn read(&self, key: &str) -> DataResult<Vec<u8>>;

    /// Store a payload under the key, replacing any previous entry.
    async fn write(&self, key: &str, data: &[u8]) -> DataResult<()>;
}

/// File-backed cache under a configured directory.
///
/// Every payload gets a sibling `<key>.sha256` checksum file; a payload
/// whose checksum no longer matches is reported as a cache error rather
/// than returned.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCache { dir: dir.into() }
    }

    fn payload_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn checksum_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.sha256", key))
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[async_trait]
impl Cache for FileCache {
    async fn exists(&self, key: &str) -> DataResult<bool> {
        match fs::metadata(self.payload_path(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DataError::Cache(e.to_string())),
        }
    }

    async fn read(&self, key: &str) -> DataResult<Vec<u8>> {
        let data = fs::read(self.payload_path(key))
            .await
            .map_err(|e| DataError::Cache(format!("reading {}: {}", key, e)))?;

        match fs::read_to_string(self.checksum_path(key)).await {
            Ok(expected) => {
                if expected.trim() != sha256_hex(&data) {
                    return Err(DataError::Cache(format!("checksum mismatch for {}", key)));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Entry written by an older version without checksums
            }
            Err(e) => return Err(DataError::Cache(e.to_string())),
        }

        Ok(data)
    }

    async fn write(&self, key: &str, data: &[u8]) -> DataResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DataError::Cache(e.to_string()))?;
        fs::write(self.payload_path(key), data)
            .await
            .map_err(|e| DataError::Cache(format!("writing {}: {}", key, e)))?;
        fs::write(self.checksum_path(key), sha256_hex(data))
            .await
            .map_err(|e| DataError::Cache(format!("writing checksum for {}: {}", key, e)))?;
        Ok(())
    }
}

/// In-memory cache stand-in for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn exists(&self, key: &str) -> DataResult<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        Ok(entries.contains_key(key))
    }

    async fn read(&self, key: &str) -> DataResult<Vec<u8>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| DataError::Cache(format!("no entry for {}", key)))
    }

    async fn write(&self, key: &str, data: &[u8]) -> DataResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        entries.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_format() {
        let key = CacheKey {
            season: 2017,
            lag: Some(3),
            as_of: Epiweek::from_value(201805),
        };
        assert_eq!(key.to_string(), "season-2017-lag-3-asof-201805.json");

        let latest = CacheKey { season: 2017, lag: None, as_of: Epiweek::from_value(201805) };
        assert_eq!(latest.to_string(), "season-2017-lag-latest-asof-201805.json");
    }

    #[tokio::test]
    async fn memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(!cache.exists("k").await.unwrap());
        cache.write("k", b"payload").await.unwrap();
        assert!(cache.exists("k").await.unwrap());
        assert_eq!(cache.read("k").await.unwrap(), b"payload");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn file_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        assert!(!cache.exists("entry.json").await.unwrap());
        cache.write("entry.json", b"{\"rows\":[]}").await.unwrap();
        assert!(cache.exists("entry.json").await.unwrap());
        assert_eq!(cache.read("entry.json").await.unwrap(), b"{\"rows\":[]}");
    }

    #[tokio::test]
    async fn file_cache_rejects_corrupted_payload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.write("entry.json", b"original").await.unwrap();
        std::fs::write(dir.path().join("entry.json"), b"tampered").unwrap();

        assert!(matches!(
            cache.read("entry.json").await,
            Err(DataError::Cache(_))
        ));
    }
}
