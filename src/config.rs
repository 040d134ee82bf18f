use crate::errors::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub linking: LinkingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the platform backend, e.g. "https://api.postsiva.com"
    pub base_url: String,
    /// Bearer token for authenticated endpoints (empty until the user signs in)
    #[serde(default)]
    pub token: String,
    pub timeout_secs: u64,
    pub rate_limit_per_minute: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Default freshness window for cached responses
    pub default_ttl_secs: u64,
    pub capacity: usize,
    /// Persist the cache to disk so entries survive process restarts
    pub persist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    /// Delay before the first linked-status check
    pub base_interval_ms: u64,
    /// Upper bound for the backoff delay
    pub max_interval_ms: u64,
    /// Overall deadline for one linking attempt
    pub deadline_ms: u64,
    pub popup_width: u32,
    pub popup_height: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.postsiva.com".to_string(),
            token: String::new(),
            timeout_secs: 15,
            rate_limit_per_minute: 60,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_secs: 120, // 2 minutes
            capacity: 256,
            persist: false,
        }
    }
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 2_000,
            max_interval_ms: 30_000,
            deadline_ms: 600_000, // 10 minutes
            popup_width: 600,
            popup_height: 700,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheSettings::default(),
            linking: LinkingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, writing defaults on first run.
    pub fn load<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ClientError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ClientResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.api.base_url.is_empty() {
            return Err(ClientError::Config("api.base_url is required".to_string()));
        }
        Url::parse(&self.api.base_url).map_err(|e| {
            ClientError::Config(format!("api.base_url is not a valid URL: {}", e))
        })?;
        if self.linking.base_interval_ms == 0 {
            return Err(ClientError::Config(
                "linking.base_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.linking.max_interval_ms < self.linking.base_interval_ms {
            return Err(ClientError::Config(
                "linking.max_interval_ms must be at least the base interval".to_string(),
            ));
        }
        Ok(())
    }
}
