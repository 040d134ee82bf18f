/// Cache configuration per resource type
///
/// Freshness windows are short: the underlying data (usage
/// counters, dashboard aggregates, tier lists) changes slowly but must never
/// feel stale to an actively-working user.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied when an insert does not carry its own TTL
    pub default_ttl: Duration,

    /// Maximum number of entries
    pub capacity: usize,
}

impl CacheConfig {
    /// Dashboard overview aggregates (slow endpoint, tolerates 2 minutes)
    pub fn dashboard_overview() -> Self {
        Self {
            default_ttl: Duration::from_secs(120),
            capacity: 64,
        }
    }

    /// Usage counters (refreshed more eagerly while the user works)
    pub fn usage() -> Self {
        Self {
            default_ttl: Duration::from_secs(60),
            capacity: 64,
        }
    }

    /// Subscription tier lists (effectively static between deploys)
    pub fn platform_tiers() -> Self {
        Self {
            default_ttl: Duration::from_secs(300), // 5 minutes
            capacity: 64,
        }
    }

    /// Custom configuration
    pub fn custom(default_ttl: Duration, capacity: usize) -> Self {
        Self {
            default_ttl,
            capacity,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(120),
            capacity: 256,
        }
    }
}
