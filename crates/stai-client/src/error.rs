//! Error types for API client operations

use thiserror::Error;

/// Analytics API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Resource does not exist, e.g. no model trained for the ticker
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body was not valid JSON
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ticker symbol rejected before any request was made
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),
}

impl ClientError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<stai_core::Error> for ClientError {
    fn from(err: stai_core::Error) -> Self {
        match err {
            stai_core::Error::InvalidTicker(t) => Self::InvalidTicker(t),
            stai_core::Error::Payload(e) => Self::Decode(e),
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
