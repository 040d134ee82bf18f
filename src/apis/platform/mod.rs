/// Platform backend client
///
/// Endpoints implemented:
/// 1. /v1/platforms/{platform}/auth-url - Authorization URL for the OAuth popup
/// 2. /v1/platforms/{platform}/link-status - Linked condition for the poller
/// 3. /v1/dashboard/overview - Dashboard aggregates (cached)
/// 4. /v1/dashboard/usage - Usage counters (cached)
/// 5. /v1/billing/tiers - Subscription tiers (cached)
pub mod types;

pub use self::types::{
    ApiEnvelope, AuthUrlData, LinkStatusData, OverviewData, TierData, UsageData,
};

use crate::apis::client::HttpClient;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::ApiConfig;
use crate::errors::{ClientError, ClientResult};
use crate::linking::LinkProbe;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// ============================================================================
// CACHE KEYS
// ============================================================================
// Version suffixes are bumped by hand whenever a payload shape changes, so a
// deploy can never reuse an incompatible cached shape.

const CACHE_KEY_OVERVIEW: &str = "dashboard_overview:v1";
const CACHE_KEY_USAGE: &str = "dashboard_usage:v1";
const CACHE_KEY_TIERS: &str = "platform_tiers:v1";

const OVERVIEW_TTL: Duration = Duration::from_secs(120);
const USAGE_TTL: Duration = Duration::from_secs(60);
const TIERS_TTL: Duration = Duration::from_secs(300);

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct PlatformClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    cache: Arc<ResponseCache>,
}

impl PlatformClient {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL: {}", e)))?;
        let http = HttpClient::new(config.timeout_secs, config.rate_limit_per_minute)?;
        let token = if config.token.is_empty() {
            None
        } else {
            Some(config.token.clone())
        };

        Ok(Self {
            http,
            base_url,
            token,
            cache: Arc::new(ResponseCache::new(CacheConfig::default())),
        })
    }

    /// Replace the response cache, e.g. with one restored from a snapshot.
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    fn endpoint_url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint path {}: {}", path, e)))
    }

    /// GET an enveloped payload, unwrapping `success`/`data`/`message`.
    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
    ) -> ClientResult<T> {
        let url = self.endpoint_url(path)?;
        let envelope: ApiEnvelope<T> = self
            .http
            .get_json(endpoint, url.as_str(), self.token.as_deref())
            .await?;

        if !envelope.success {
            return Err(ClientError::Api(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{} reported failure", endpoint)),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ClientError::Data(format!("{} returned no data", endpoint)))
    }

    // ------------------------------------------------------------------
    // Linking endpoints (never cached; the poller needs live answers)
    // ------------------------------------------------------------------

    /// Authorization URL to open in the OAuth popup.
    pub async fn authorization_url(&self, platform: &str) -> ClientResult<String> {
        let path = format!("v1/platforms/{}/auth-url", platform);
        let data: AuthUrlData = self.get_enveloped("auth-url", &path).await?;
        Ok(data.url)
    }

    /// Whether the external account has been linked yet.
    pub async fn link_status(&self, platform: &str) -> ClientResult<LinkStatusData> {
        let path = format!("v1/platforms/{}/link-status", platform);
        self.get_enveloped("link-status", &path).await
    }

    // ------------------------------------------------------------------
    // Cached aggregate reads
    // ------------------------------------------------------------------

    pub async fn dashboard_overview(&self, force_refresh: bool) -> ClientResult<OverviewData> {
        self.cached_get(
            CACHE_KEY_OVERVIEW,
            OVERVIEW_TTL,
            force_refresh,
            "overview",
            "v1/dashboard/overview",
        )
        .await
    }

    pub async fn usage(&self, force_refresh: bool) -> ClientResult<UsageData> {
        self.cached_get(
            CACHE_KEY_USAGE,
            USAGE_TTL,
            force_refresh,
            "usage",
            "v1/dashboard/usage",
        )
        .await
    }

    pub async fn platform_tiers(&self, force_refresh: bool) -> ClientResult<Vec<TierData>> {
        self.cached_get(
            CACHE_KEY_TIERS,
            TIERS_TTL,
            force_refresh,
            "tiers",
            "v1/billing/tiers",
        )
        .await
    }

    async fn cached_get<T>(
        &self,
        key: &str,
        ttl: Duration,
        force_refresh: bool,
        endpoint: &str,
        path: &str,
    ) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        self.cache
            .fetch_with_cache(key, ttl, force_refresh, || {
                self.get_enveloped::<T>(endpoint, path)
            })
            .await
    }
}

/// Adapter exposing one platform's linked condition to the poller.
pub struct PlatformLinkProbe {
    client: Arc<PlatformClient>,
    platform: String,
}

impl PlatformLinkProbe {
    pub fn new(client: Arc<PlatformClient>, platform: impl Into<String>) -> Self {
        Self {
            client,
            platform: platform.into(),
        }
    }
}

#[async_trait]
impl LinkProbe for PlatformLinkProbe {
    async fn is_linked(&self) -> ClientResult<bool> {
        let status = self.client.link_status(&self.platform).await?;
        Ok(status.linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn client() -> PlatformClient {
        PlatformClient::new(&ApiConfig::default()).unwrap()
    }

    #[test]
    fn endpoint_urls_join_against_base() {
        let client = client();
        let url = client.endpoint_url("v1/dashboard/overview").unwrap();
        assert_eq!(url.as_str(), "https://api.postsiva.com/v1/dashboard/overview");
    }

    #[test]
    fn empty_token_is_not_sent() {
        let config = ApiConfig {
            token: String::new(),
            ..ApiConfig::default()
        };
        let client = PlatformClient::new(&config).unwrap();
        assert!(client.token.is_none());
    }
}
