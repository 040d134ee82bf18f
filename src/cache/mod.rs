//! Response caching for slow aggregate read endpoints
//!
//! The backend's dashboard aggregates are expensive to compute and change
//! slowly, so idempotent reads are wrapped in a short-lived cache keyed by
//! caller-namespaced strings. Keys carry an explicit version suffix (e.g.
//! `dashboard_overview:v1`) so payload-shape changes never silently reuse
//! stale data.
//!
//! Reading an expired or absent entry behaves identically to a miss; stale
//! data is never returned. The cache itself cannot fail: a failed network
//! call propagates to the caller unchanged and the cache stays unpopulated.

use crate::errors::ClientResult;
use crate::logger::{self, LogTag};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub mod config;
pub mod manager;
pub mod storage;

pub use config::CacheConfig;
pub use manager::{CacheMetrics, TtlCache};

/// TTL cache for JSON API responses
///
/// Stores payloads as `serde_json::Value` so one cache can hold responses of
/// different shapes; typed access goes through serde on the way in and out.
pub struct ResponseCache {
    store: TtlCache<String, Value>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: TtlCache::new(config),
        }
    }

    /// Typed read. Returns None on absence, expiry, or a payload that no
    /// longer deserializes into `T` (a shape change without a key-version
    /// bump); all three are ordinary misses.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(&key.to_string())?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                logger::debug(
                    LogTag::Cache,
                    &format!("Cached payload for {} no longer deserializes: {}", key, e),
                );
                None
            }
        }
    }

    /// Typed write with an explicit TTL, overwriting any prior entry.
    ///
    /// A payload that cannot be serialized is skipped with a warning rather
    /// than surfaced; callers already hold the value they asked for.
    pub fn store_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => self.store.insert_with_ttl(key.to_string(), json, ttl),
            Err(e) => {
                logger::warning(
                    LogTag::Cache,
                    &format!("Could not cache payload for {}: {}", key, e),
                );
            }
        }
    }

    /// Fetch-through wrapper used by every cached read endpoint.
    ///
    /// Unless `force_refresh` is set, a fresh cache entry short-circuits the
    /// network call. On a miss (or forced refresh) the fetch runs and its
    /// result repopulates the cache before being returned, so the next
    /// normal call benefits. Fetch failures propagate unchanged.
    pub async fn fetch_with_cache<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        force_refresh: bool,
        fetch: F,
    ) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if !force_refresh {
            if let Some(hit) = self.get_json::<T>(key) {
                logger::debug(LogTag::Cache, &format!("Cache hit for {}", key));
                return Ok(hit);
            }
        }

        let fresh = fetch().await?;
        self.store_json(key, &fresh, ttl);
        logger::debug(LogTag::Cache, &format!("Cache refreshed for {}", key));
        Ok(fresh)
    }

    pub fn remove(&self, key: &str) {
        self.store.remove(&key.to_string());
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.store.metrics()
    }

    /// Live entries with remaining TTL, for the snapshot writer.
    pub(crate) fn entries(&self) -> Vec<(String, Value, Duration)> {
        self.store.entries()
    }

    pub(crate) fn restore(&self, key: String, value: Value, remaining: Duration) {
        self.store.insert_with_ttl(key, value, remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Overview {
        connected_pages: u32,
        scheduled_posts: u32,
    }

    fn sample() -> Overview {
        Overview {
            connected_pages: 3,
            scheduled_posts: 12,
        }
    }

    #[test]
    fn typed_roundtrip() {
        let cache = ResponseCache::new(CacheConfig::default());

        cache.store_json("dashboard_overview:v1", &sample(), Duration::from_secs(60));
        let hit: Option<Overview> = cache.get_json("dashboard_overview:v1");
        assert_eq!(hit, Some(sample()));
    }

    #[test]
    fn shape_mismatch_is_a_miss() {
        #[derive(Serialize)]
        struct OldShape {
            something_else: String,
        }

        let cache = ResponseCache::new(CacheConfig::default());
        cache.store_json(
            "dashboard_overview:v1",
            &OldShape {
                something_else: "x".to_string(),
            },
            Duration::from_secs(60),
        );

        let hit: Option<Overview> = cache.get_json("dashboard_overview:v1");
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn fetch_with_cache_short_circuits_second_call() {
        let cache = ResponseCache::new(CacheConfig::default());
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Overview = cache
                .fetch_with_cache("overview:v1", Duration::from_secs(60), false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                })
                .await
                .unwrap();
            assert_eq!(result, sample());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_fresh_entry_and_repopulates() {
        let cache = ResponseCache::new(CacheConfig::default());

        let first: Overview = cache
            .fetch_with_cache("overview:v1", Duration::from_secs(60), false, || async {
                Ok(sample())
            })
            .await
            .unwrap();
        assert_eq!(first.scheduled_posts, 12);

        let updated = Overview {
            connected_pages: 3,
            scheduled_posts: 13,
        };
        let refreshed: Overview = cache
            .fetch_with_cache("overview:v1", Duration::from_secs(60), true, || {
                let updated = updated.clone();
                async move { Ok(updated) }
            })
            .await
            .unwrap();
        assert_eq!(refreshed.scheduled_posts, 13);

        // The forced result repopulated the cache for the next normal call
        let cached: Option<Overview> = cache.get_json("overview:v1");
        assert_eq!(cached.map(|o| o.scheduled_posts), Some(13));
    }

    #[tokio::test]
    async fn fetch_failure_propagates_and_leaves_cache_empty() {
        let cache = ResponseCache::new(CacheConfig::default());

        let result: ClientResult<Overview> = cache
            .fetch_with_cache("overview:v1", Duration::from_secs(60), false, || async {
                Err(ClientError::Network("backend unreachable".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
        assert!(cache.is_empty());

        // The next call retries the network unconditionally
        let calls = AtomicUsize::new(0);
        let recovered: Overview = cache
            .fetch_with_cache("overview:v1", Duration::from_secs(60), false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(sample())
            })
            .await
            .unwrap();
        assert_eq!(recovered, sample());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
