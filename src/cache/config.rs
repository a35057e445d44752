//! Cache configuration.
//!
//! Controls the in-process store capacity and the read-path expiry windows.

use std::{num::NonZeroUsize, time::Duration};

const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_LATEST_LIMIT: u32 = 10;
const DEFAULT_LATEST_TTL_MINUTES: u64 = 15;
const DEFAULT_TOTAL_TTL_MINUTES: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of keys held before least-recently-used eviction.
    pub capacity: usize,
    /// Number of ids cached under the latest-articles key.
    pub latest_limit: u32,
    /// Expiry of the latest-articles id list.
    pub latest_ttl: Duration,
    /// Expiry of the cached article total.
    pub total_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            latest_limit: DEFAULT_LATEST_LIMIT,
            latest_ttl: minutes(DEFAULT_LATEST_TTL_MINUTES),
            total_ttl: minutes(DEFAULT_TOTAL_TTL_MINUTES),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            capacity: settings.capacity.get(),
            latest_limit: settings.latest_limit.get(),
            latest_ttl: settings.latest_ttl,
            total_ttl: settings.total_ttl,
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

pub(crate) fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}
