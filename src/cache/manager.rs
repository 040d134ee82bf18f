/// Generic in-memory cache with per-entry TTL
///
/// Thread-safe, generic over key/value types. Entries are expired lazily at
/// read time: an expired entry behaves exactly like a missing one and is
/// removed on the access that discovers it. There is no background sweep.
/// Tracks metrics for monitoring.

use super::config::CacheConfig;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Cache entry with an absolute expiry deadline
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Generic TTL cache
pub struct TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    config: CacheConfig,
    data: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    metrics: Arc<RwLock<CacheMetrics>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Create new cache with given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            data: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(RwLock::new(CacheMetrics::default())),
        }
    }

    /// Get value from cache (returns None if expired or missing)
    pub fn get(&self, key: &K) -> Option<V> {
        let mut data = self.data.write().unwrap();

        if let Some(entry) = data.get(key) {
            if entry.is_expired() {
                data.remove(key);

                let mut metrics = self.metrics.write().unwrap();
                metrics.misses += 1;
                metrics.expirations += 1;

                return None;
            }

            let mut metrics = self.metrics.write().unwrap();
            metrics.hits += 1;

            data.get(key).map(|e| e.value.clone())
        } else {
            let mut metrics = self.metrics.write().unwrap();
            metrics.misses += 1;
            None
        }
    }

    /// Insert with the cache-wide default TTL (last write wins)
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert with an explicit TTL, overwriting any prior entry for that key
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut data = self.data.write().unwrap();

        if data.len() >= self.config.capacity && !data.contains_key(&key) {
            self.make_room(&mut data);
        }

        data.insert(key, CacheEntry::new(value, ttl));

        let mut metrics = self.metrics.write().unwrap();
        metrics.inserts += 1;
    }

    /// Remove specific key from cache
    pub fn remove(&self, key: &K) {
        let mut data = self.data.write().unwrap();
        data.remove(key);
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        data.clear();
    }

    /// Snapshot the live entries with their remaining TTL.
    ///
    /// Expired entries are skipped, not removed; they fall to the next read.
    pub fn entries(&self) -> Vec<(K, V, Duration)> {
        let now = Instant::now();
        let data = self.data.read().unwrap();
        data.iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, entry)| {
                (
                    key.clone(),
                    entry.value.clone(),
                    entry.expires_at.duration_since(now),
                )
            })
            .collect()
    }

    /// Get current metrics
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.read().unwrap().clone()
    }

    /// Get current cache size (including not-yet-collected expired entries)
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Private: free a slot when at capacity. Expired entries go first; if
    // none are expired the entry nearest its deadline is dropped, since it
    // would be the first to expire anyway.
    fn make_room(&self, data: &mut HashMap<K, CacheEntry<V>>) {
        let before = data.len();
        data.retain(|_, entry| !entry.is_expired());

        let purged = before - data.len();
        if purged > 0 {
            let mut metrics = self.metrics.write().unwrap();
            metrics.expirations += purged as u64;
            return;
        }

        let nearest = data
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = nearest {
            data.remove(&key);

            let mut metrics = self.metrics.write().unwrap();
            metrics.evictions += 1;
        }
    }
}
