use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cache trait - abstraction over caching backends (Redis, in-memory).
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value in the cache with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> bool;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Return the value cached under `key`, or run `compute`, store its result
/// for `ttl` and return it.
///
/// The cache is best effort: unreadable entries are recomputed and a failing
/// backend only costs a recomputation. Errors from `compute` are returned
/// as-is and nothing is stored.
pub async fn get_or_compute<T, E, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(raw) = cache.get(key).await {
        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
        }
    }

    let value = compute().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, &raw, Some(ttl)).await {
                tracing::warn!(key = %key, error = %e, "Cache SET failed");
            }
        }
        Err(e) => tracing::warn!(key = %key, error = %e, "Value not cacheable"),
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapCache(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> bool {
            self.0.lock().unwrap().contains_key(key)
        }
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = MapCache::default();
        let ttl = Duration::from_secs(20);

        let first: Result<Vec<u32>, ()> =
            get_or_compute(&cache, "k", ttl, || async { Ok(vec![1, 2]) }).await;
        let second: Result<Vec<u32>, ()> =
            get_or_compute(&cache, "k", ttl, || async { Ok(vec![3]) }).await;

        assert_eq!(first.unwrap(), vec![1, 2]);
        assert_eq!(second.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = MapCache::default();
        let ttl = Duration::from_secs(20);

        let failed: Result<u32, &str> =
            get_or_compute(&cache, "k", ttl, || async { Err("boom") }).await;
        assert!(failed.is_err());
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_garbage_entry_is_recomputed() {
        let cache = MapCache::default();
        cache.set("k", "not json", None).await.unwrap();

        let value: Result<u32, ()> =
            get_or_compute(&cache, "k", Duration::from_secs(1), || async { Ok(7) }).await;

        assert_eq!(value.unwrap(), 7);
        assert_eq!(cache.get("k").await.as_deref(), Some("7"));
    }
}
