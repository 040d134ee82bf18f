/// Base HTTP client with rate limiting
///
/// Requests to the platform are serialized through a single-permit semaphore
/// and spaced by the minimum interval a per-minute budget implies, so burst
/// navigation in a front-end never turns into a request storm.

use crate::errors::{ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Rate limiter for the platform client
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)), // Only 1 concurrent request
            last_request: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until the next request may go out.
    pub async fn acquire(&self, endpoint: &str) -> ClientResult<RateLimitGuard> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ClientError::RateLimit {
                endpoint: endpoint.to_string(),
            })?;

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// HTTP client wrapper shared by all platform endpoints
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, rate_limit_per_minute: usize) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit_per_minute),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Execute a GET and decode the JSON body.
    ///
    /// `endpoint` is a short label used for rate-limiter bookkeeping and
    /// error messages, not the URL.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        bearer_token: Option<&str>,
    ) -> ClientResult<T> {
        let request = self.client.get(url);
        self.execute_json(endpoint, request, bearer_token).await
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
        bearer_token: Option<&str>,
    ) -> ClientResult<T> {
        let _guard = self.rate_limiter.acquire(endpoint).await?;

        let request = match bearer_token {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ClientError::RateLimit {
                    endpoint: endpoint.to_string(),
                });
            }
            return Err(ClientError::Api(format!(
                "{} returned HTTP {}: {}",
                endpoint, status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Data(format!("{} response not decodable: {}", endpoint, e)))
    }
}
