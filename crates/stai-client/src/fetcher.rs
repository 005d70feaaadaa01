//! Concurrent per-ticker fetching into a [`Snapshot`]
//!
//! Every ticker is fetched independently and may fail on its own. The fetch
//! round always produces a snapshot: failed records are replaced or dropped
//! according to the [`FailurePolicy`], and the failure is recorded on the
//! snapshot. Output maps follow the order the tickers were requested in.

use crate::api::DashboardApi;
use crate::config::{ClientConfig, FailurePolicy};
use crate::error::{ClientError, Result};
use futures::stream::{self, StreamExt};
use stai_core::{
    FetchFailure, PriceHistory, RawPrediction, RawSentiment, Snapshot, TickerMap,
    normalize_ticker,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Options for one fetch round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub failure_policy: FailurePolicy,
    pub max_concurrency: usize,
    pub price_range_days: Option<u32>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for FetchOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            failure_policy: config.failure_policy,
            max_concurrency: config.max_concurrency,
            price_range_days: config.price_range_days,
        }
    }
}

struct TickerResult {
    prediction: Result<RawPrediction>,
    sentiment: Result<RawSentiment>,
    history: Option<Result<PriceHistory>>,
}

/// Builds snapshots from a [`DashboardApi`]
pub struct SnapshotFetcher<A: ?Sized> {
    api: Arc<A>,
    options: FetchOptions,
}

impl<A: DashboardApi + ?Sized> SnapshotFetcher<A> {
    pub fn new(api: Arc<A>, options: FetchOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch every ticker and settle the results into one snapshot
    ///
    /// Symbols are trimmed, uppercased and deduplicated. Invalid symbols are
    /// recorded as failures without a request.
    pub async fn fetch<S: AsRef<str>>(&self, tickers: &[S]) -> Snapshot {
        let started = Instant::now();
        let mut failures = Vec::new();
        let mut valid: Vec<String> = Vec::new();

        for raw in tickers {
            match normalize_ticker(raw.as_ref()) {
                Ok(ticker) if !valid.contains(&ticker) => valid.push(ticker),
                Ok(_) => {}
                Err(e) => {
                    warn!(ticker = raw.as_ref(), "Skipping invalid ticker");
                    failures.push(FetchFailure::new(raw.as_ref(), e.to_string()));
                }
            }
        }

        let mut results: Vec<(usize, String, TickerResult)> =
            stream::iter(valid.into_iter().enumerate())
                .map(|(idx, ticker)| async move {
                    let result = self.fetch_ticker(&ticker).await;
                    (idx, ticker, result)
                })
                .buffer_unordered(self.options.max_concurrency.max(1))
                .collect()
                .await;
        results.sort_by_key(|(idx, _, _)| *idx);

        let mut predictions = TickerMap::new();
        let mut sentiments = TickerMap::new();
        let mut price_history = TickerMap::new();

        for (_, ticker, result) in results {
            let prediction = self.settle(
                &ticker,
                "prediction",
                result.prediction,
                RawPrediction::fallback,
                &mut failures,
            );
            if let Some(p) = prediction {
                predictions.insert(ticker.clone(), p);
            }

            let sentiment = self.settle(
                &ticker,
                "sentiment",
                result.sentiment,
                RawSentiment::fallback,
                &mut failures,
            );
            if let Some(s) = sentiment {
                sentiments.insert(ticker.clone(), s);
            }

            match result.history {
                Some(Ok(history)) => {
                    price_history.insert(ticker, history);
                }
                Some(Err(e)) => {
                    warn!(%ticker, error = %e, "Price history unavailable");
                    failures.push(FetchFailure::new(ticker, format!("price history: {e}")));
                }
                None => {}
            }
        }

        info!(
            tickers = predictions.len(),
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Snapshot fetched"
        );

        Snapshot::new(predictions, sentiments)
            .with_price_history(price_history)
            .with_failures(failures)
    }

    async fn fetch_ticker(&self, ticker: &str) -> TickerResult {
        let history = async {
            match self.options.price_range_days {
                Some(days) => Some(self.api.fetch_price_history(ticker, days).await),
                None => None,
            }
        };

        let (prediction, sentiment, history) = tokio::join!(
            self.api.fetch_prediction(ticker),
            self.api.fetch_sentiment(ticker),
            history,
        );

        TickerResult {
            prediction,
            sentiment,
            history,
        }
    }

    /// Apply the failure policy to one record
    fn settle<T>(
        &self,
        ticker: &str,
        kind: &str,
        result: Result<T>,
        fallback: fn() -> T,
        failures: &mut Vec<FetchFailure>,
    ) -> Option<T> {
        match result {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(ticker, kind, error = %e, "Fetch failed");
                failures.push(FetchFailure::new(ticker, format!("{kind}: {e}")));
                match self.options.failure_policy {
                    FailurePolicy::Fallback => Some(fallback()),
                    FailurePolicy::Skip => None,
                }
            }
        }
    }
}

/// Fetch the API's ticker list, falling back to `defaults` on failure
pub async fn available_tickers<A>(api: &A, defaults: &[String]) -> Vec<String>
where
    A: DashboardApi + ?Sized,
{
    match api.list_tickers().await {
        Ok(tickers) if !tickers.is_empty() => tickers,
        Ok(_) => defaults.to_vec(),
        Err(e) => {
            warn!(error = %e, "Ticker list unavailable, using defaults");
            defaults.to_vec()
        }
    }
}

/// Reject symbols before any request is made
pub fn validate_tickers<S: AsRef<str>>(tickers: &[S]) -> Result<Vec<String>> {
    tickers
        .iter()
        .map(|t| normalize_ticker(t.as_ref()).map_err(ClientError::from))
        .collect()
}
