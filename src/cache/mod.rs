//! Gazette cache layer.
//!
//! A key-value store with per-entry expiry plus the `remember` helper used by
//! the article read paths. Values are stored as JSON so any serializable
//! projection can be cached behind the object-safe [`CacheStore`] trait.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! capacity = 1024
//! latest_limit = 10
//! latest_ttl_minutes = 15
//! total_ttl_minutes = 60
//! ```

mod config;
pub mod keys;
mod lock;
mod remember;
mod store;

pub use self::config::CacheConfig;
pub use remember::{METRIC_CACHE_HIT, METRIC_CACHE_MISS, remember};
pub use store::{CacheError, CacheStore, MemoryCacheStore};
