//! Cache storage implementations.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::lock_recovering;

const SOURCE: &str = "cache::store";

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
const MAX_TTL: Duration = Duration::from_secs(u32::MAX as u64);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to serialize cached value for `{key}`: {message}")]
    Serialize { key: String, message: String },
}

/// Key-value store with per-entry expiry.
///
/// Implementations must treat an expired entry exactly like a missing one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Drop a single key, returning whether a live entry was removed.
    async fn forget(&self, key: &str) -> bool;

    async fn flush(&self);
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-process LRU store. Expired entries are dropped lazily on read.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Number of entries held, including ones that have expired but were not
    /// read since.
    pub fn len(&self) -> usize {
        lock_recovering(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = lock_recovering(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_TTL))
            .or_else(|| now.checked_add(Duration::from_secs(u64::from(u16::MAX))))
            .unwrap_or(now);
        lock_recovering(&self.entries, SOURCE, "put")
            .put(key.to_string(), Entry { value, expires_at });
    }

    async fn forget(&self, key: &str) -> bool {
        match lock_recovering(&self.entries, SOURCE, "forget").pop(key) {
            Some(entry) => Instant::now() < entry.expires_at,
            None => false,
        }
    }

    async fn flush(&self) {
        lock_recovering(&self.entries, SOURCE, "flush").clear();
    }
}
