//! Core data model for the StAI dashboard
//!
//! This crate turns the loosely-typed per-ticker records served by the StAI
//! analytics API into the numbers the dashboard shows:
//!
//! - Confidence normalization across `"85%"`, `85` and `0.85` forms
//! - Aggregate metrics (average confidence, bullish count, sentiment, news)
//! - The single highest-confidence prediction
//! - Portfolio comparison metrics and insight buckets
//!
//! Everything here is a pure function of a [`Snapshot`]. Nothing fails on bad
//! data; malformed fields fall back to documented defaults.
//!
//! # Example
//!
//! ```
//! use stai_core::Snapshot;
//!
//! let snapshot = Snapshot::from_json(
//!     r#"{"AAPL": {"confidence": "60%"}, "GOOG": {"confidence": "85%"}}"#,
//!     Some(r#"{"AAPL": {"sentiment_score": 0.4, "articles": []}}"#),
//! )?;
//!
//! assert_eq!(snapshot.best_prediction().ticker, "GOOG");
//! assert_eq!(snapshot.metrics().avg_confidence, 73);
//! # Ok::<(), stai_core::Error>(())
//! ```

pub mod aggregator;
pub mod confidence;
pub mod error;
mod lenient;
pub mod model;
pub mod portfolio;
pub mod snapshot;
pub mod ticker;
pub mod trend;

pub use aggregator::{AggregateMetrics, BestPrediction, PLACEHOLDER, aggregate, best_prediction};
pub use confidence::{NormalizedConfidence, RawConfidence};
pub use error::{Error, Result};
pub use model::{
    Article, PriceChange, PriceHistory, PricePoint, RawPrediction, RawSentiment, SentimentLabel,
    SentimentSummary,
};
pub use portfolio::{DEFAULT_BUY_THRESHOLD, Insights, PortfolioMetrics, RankedPrediction, RiskLevel};
pub use snapshot::{FetchFailure, Snapshot};
pub use ticker::{TickerMap, normalize_ticker};
pub use trend::Trend;
