//! Configuration for the analytics API client

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// How a ticker whose request failed appears in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Substitute the neutral placeholder record (zero prediction and
    /// confidence, `neutral` trend, no articles)
    #[default]
    Fallback,
    /// Leave the ticker out of the affected map
    Skip,
}

/// Configuration for the analytics API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analytics API
    pub base_url: String,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Maximum number of attempts per request
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Upper bound for a single backoff
    pub retry_backoff_max: Duration,

    /// Requests per second across all tickers
    pub rate_limit_per_second: u32,

    /// Tickers fetched at the same time
    pub max_concurrency: usize,

    /// Treatment of failed per-ticker requests
    pub failure_policy: FailurePolicy,

    /// Days of price history to fetch alongside each ticker; `None` skips it
    pub price_range_days: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: stai_utils::config::DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff_base: Duration::from_millis(250),
            retry_backoff_max: Duration::from_secs(5),
            rate_limit_per_second: 10,
            max_concurrency: 4,
            failure_policy: FailurePolicy::Fallback,
            price_range_days: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Client settings derived from the application configuration
    pub fn from_app_config(app: &stai_utils::Config) -> Result<Self> {
        Self::builder()
            .base_url(&app.api_base_url)
            .request_timeout(Duration::from_secs(app.request_timeout_secs))
            .build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::Config(format!("invalid base_url {:?}: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.max_retries == 0 {
            return Err(ClientError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_second == 0 {
            return Err(ClientError::Config(
                "rate_limit_per_second must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(ClientError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    retry_backoff_max: Option<Duration>,
    rate_limit_per_second: Option<u32>,
    max_concurrency: Option<usize>,
    failure_policy: Option<FailurePolicy>,
    price_range_days: Option<u32>,
}

impl ClientConfigBuilder {
    /// Set the API base URL; a trailing slash is dropped
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum attempts per request
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set the backoff cap
    pub fn retry_backoff_max(mut self, duration: Duration) -> Self {
        self.retry_backoff_max = Some(duration);
        self
    }

    pub fn rate_limit_per_second(mut self, limit: u32) -> Self {
        self.rate_limit_per_second = Some(limit);
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Also fetch this many days of price history per ticker
    pub fn price_range_days(mut self, days: u32) -> Self {
        self.price_range_days = Some(days);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let config = ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            retry_backoff_max: self.retry_backoff_max.unwrap_or(defaults.retry_backoff_max),
            rate_limit_per_second: self
                .rate_limit_per_second
                .unwrap_or(defaults.rate_limit_per_second),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            failure_policy: self.failure_policy.unwrap_or(defaults.failure_policy),
            price_range_days: self.price_range_days.or(defaults.price_range_days),
        };

        config.validate()?;
        Ok(config)
    }
}
