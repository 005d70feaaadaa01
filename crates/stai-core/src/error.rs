//! Error types for stai-core
//!
//! Aggregation itself never fails: malformed fields degrade to defaults.
//! These errors only surface at the input boundary.

use thiserror::Error;

/// Result type alias for stai-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for boundary operations
#[derive(Error, Debug)]
pub enum Error {
    /// Ticker symbol failed validation
    #[error("Invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    /// Payload was not valid JSON, or not a JSON object keyed by ticker
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
