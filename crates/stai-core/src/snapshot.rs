//! Settled view of one fetch round
//!
//! A `Snapshot` is assembled once, after every per-ticker request has
//! finished or failed, and is read-only afterwards. All dashboard views are
//! derived from it on demand.

use crate::aggregator::{self, AggregateMetrics, BestPrediction};
use crate::error::Result;
use crate::model::{PriceHistory, RawPrediction, RawSentiment};
use crate::portfolio::{self, Insights, PortfolioMetrics, RankedPrediction};
use crate::ticker::TickerMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ticker whose fetch did not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub ticker: String,
    pub reason: String,
}

impl FetchFailure {
    pub fn new(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

/// Immutable per-ticker data for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    predictions: TickerMap<RawPrediction>,
    sentiments: TickerMap<RawSentiment>,
    price_history: TickerMap<PriceHistory>,
    failures: Vec<FetchFailure>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(predictions: TickerMap<RawPrediction>, sentiments: TickerMap<RawSentiment>) -> Self {
        Self {
            predictions,
            sentiments,
            price_history: TickerMap::new(),
            failures: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn with_price_history(mut self, price_history: TickerMap<PriceHistory>) -> Self {
        self.price_history = price_history;
        self
    }

    pub fn with_failures(mut self, failures: Vec<FetchFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// Build from JSON objects keyed by ticker
    ///
    /// Records inside the objects are read leniently; only a document that
    /// is not a JSON object is an error.
    pub fn from_json(predictions: &str, sentiments: Option<&str>) -> Result<Self> {
        let predictions: TickerMap<RawPrediction> = serde_json::from_str(predictions)?;
        let sentiments: TickerMap<RawSentiment> = match sentiments {
            Some(json) => serde_json::from_str(json)?,
            None => TickerMap::new(),
        };
        Ok(Self::new(predictions, sentiments))
    }

    pub fn predictions(&self) -> &TickerMap<RawPrediction> {
        &self.predictions
    }

    pub fn sentiments(&self) -> &TickerMap<RawSentiment> {
        &self.sentiments
    }

    pub fn price_history(&self) -> &TickerMap<PriceHistory> {
        &self.price_history
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Tickers present in either map, predictions first
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.predictions.tickers().collect();
        for ticker in self.sentiments.tickers() {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        tickers
    }

    pub fn metrics(&self) -> AggregateMetrics {
        aggregator::aggregate(&self.predictions, &self.sentiments)
    }

    pub fn best_prediction(&self) -> BestPrediction {
        aggregator::best_prediction(&self.predictions)
    }

    pub fn portfolio(&self) -> PortfolioMetrics {
        PortfolioMetrics::from_predictions(&self.predictions)
    }

    pub fn ranked(&self) -> Vec<RankedPrediction> {
        portfolio::rank_by_confidence(&self.predictions)
    }

    pub fn insights(&self, buy_threshold: f64) -> Insights {
        Insights::from_predictions(&self.predictions, buy_threshold)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(TickerMap::new(), TickerMap::new())
    }
}
