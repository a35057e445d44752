use std::future::Future;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::store::{CacheError, CacheStore};

pub const METRIC_CACHE_HIT: &str = "gazette_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "gazette_cache_miss_total";

/// Return the value cached under `key`, or run `producer`, store its output
/// for `ttl` and return it.
///
/// There is no single-flight guard: concurrent misses each run the producer
/// and the last write wins. A cached value that no longer deserializes into
/// `T` counts as a miss. Producer errors are returned unchanged and nothing
/// is cached.
pub async fn remember<T, E, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    producer: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(cached) = store.get(key).await {
        match serde_json::from_value::<T>(cached) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "key" => key.to_string()).increment(1);
                return Ok(value);
            }
            Err(err) => {
                warn!(
                    target = "gazette::cache",
                    key,
                    error = %err,
                    "Discarding cached value with unexpected shape"
                );
            }
        }
    }

    counter!(METRIC_CACHE_MISS, "key" => key.to_string()).increment(1);
    let value = producer().await?;
    let encoded = serde_json::to_value(&value).map_err(|err| CacheError::Serialize {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    store.put(key, encoded, ttl).await;
    debug!(
        target = "gazette::cache",
        key,
        ttl_secs = ttl.as_secs(),
        "Stored recomputed value"
    );

    Ok(value)
}
