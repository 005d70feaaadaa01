//! StAI analytics API client
//!
//! Endpoints, relative to the configured base URL:
//!
//! | method | path | body |
//! |---|---|---|
//! | GET | `/predict/{ticker}` | prediction record |
//! | GET | `/sentiment/{ticker}` | sentiment record with articles |
//! | GET | `/price-history/{ticker}?range={days}` | `{"history": [...]}` |
//! | GET | `/tickers` | `{"tickers": [...]}` |

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use stai_core::{PriceHistory, RawPrediction, RawSentiment};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Data source for dashboard snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Latest model prediction for a ticker
    async fn fetch_prediction(&self, ticker: &str) -> Result<RawPrediction>;

    /// News sentiment for a ticker
    async fn fetch_sentiment(&self, ticker: &str) -> Result<RawSentiment>;

    /// Closing prices over the last `range_days` days
    async fn fetch_price_history(&self, ticker: &str, range_days: u32) -> Result<PriceHistory>;

    /// Tickers the API has models for
    async fn list_tickers(&self) -> Result<Vec<String>>;
}

/// reqwest-backed [`DashboardApi`]
#[derive(Debug, Clone)]
pub struct StaiClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
    rate_limiter: SharedRateLimiter,
}

impl StaiClient {
    /// Create a client from a validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("stai/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base_url: {e}")))?;

        let per_second = NonZeroU32::new(config.rate_limit_per_second).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second);

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::from_config(config),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Build an endpoint URL below the base path; segments are percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Config(format!("base_url {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document with rate limiting and retries
    async fn get_json(&self, url: Url) -> Result<Value> {
        let operation = url.path().to_string();
        self.retry
            .execute(&operation, || {
                let url = url.clone();
                async move {
                    self.rate_limiter.until_ready().await;
                    debug!(%url, "GET");

                    let response = self.client.get(url.clone()).send().await?;
                    let status = response.status();
                    let body = response.text().await?;

                    if status == StatusCode::NOT_FOUND {
                        return Err(ClientError::NotFound(url.path().to_string()));
                    }
                    if !status.is_success() {
                        return Err(ClientError::Status {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    Ok(serde_json::from_str(&body)?)
                }
            })
            .await
    }
}

#[async_trait]
impl DashboardApi for StaiClient {
    async fn fetch_prediction(&self, ticker: &str) -> Result<RawPrediction> {
        let url = self.endpoint(&["predict", ticker])?;
        let value = self.get_json(url).await?;
        Ok(RawPrediction::from_value(&value))
    }

    async fn fetch_sentiment(&self, ticker: &str) -> Result<RawSentiment> {
        let url = self.endpoint(&["sentiment", ticker])?;
        let value = self.get_json(url).await?;
        Ok(RawSentiment::from_value(&value))
    }

    async fn fetch_price_history(&self, ticker: &str, range_days: u32) -> Result<PriceHistory> {
        let mut url = self.endpoint(&["price-history", ticker])?;
        url.query_pairs_mut()
            .append_pair("range", &range_days.to_string());
        let value = self.get_json(url).await?;
        Ok(PriceHistory::from_value(&value))
    }

    async fn list_tickers(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["tickers"])?;
        let value = self.get_json(url).await?;

        let tickers = value
            .get("tickers")
            .or(Some(&value))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(tickers)
    }
}
