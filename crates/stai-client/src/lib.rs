//! HTTP client for the StAI analytics API
//!
//! [`StaiClient`] talks to the prediction, sentiment and price-history
//! endpoints with retries and client-side rate limiting.
//! [`SnapshotFetcher`] fans out over a ticker list and settles the results
//! into a [`stai_core::Snapshot`], never failing the round as a whole.

pub mod api;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod retry;

pub use api::{DashboardApi, StaiClient};
pub use config::{ClientConfig, ClientConfigBuilder, FailurePolicy};
pub use error::{ClientError, Result};
pub use fetcher::{FetchOptions, SnapshotFetcher, available_tickers, validate_tickers};
pub use retry::RetryPolicy;
