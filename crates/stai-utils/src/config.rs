//! Configuration management utilities

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tickers shown on the landing dashboard when none are configured
pub const DEFAULT_TICKERS: &[&str] = &["AAPL", "GOOGL", "TSLA"];

/// Local development address of the analytics API
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Base URL of the analytics API
    pub api_base_url: String,
    /// Tickers fetched when the user names none
    pub tickers: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            tickers: DEFAULT_TICKERS.iter().map(ToString::to_string).collect(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables
    ///
    /// - `STAI_API_BASE_URL` (falls back to `VITE_API_BASE_URL`)
    /// - `STAI_TICKERS`, comma separated
    /// - `STAI_TIMEOUT_SECS`
    /// - `STAI_ENV`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("STAI_API_BASE_URL").or_else(|| lookup("VITE_API_BASE_URL")) {
            let url = url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                return Err(ConfigError::Empty("STAI_API_BASE_URL"));
            }
            config.api_base_url = url;
        }

        if let Some(list) = lookup("STAI_TICKERS") {
            let tickers: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_uppercase)
                .collect();
            if tickers.is_empty() {
                return Err(ConfigError::Empty("STAI_TICKERS"));
            }
            config.tickers = tickers;
        }

        if let Some(raw) = lookup("STAI_TIMEOUT_SECS") {
            config.request_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "STAI_TIMEOUT_SECS",
                    value: raw,
                })?;
        }

        if let Some(env) = lookup("STAI_ENV") {
            config.environment = env;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.tickers, vec!["AAPL", "GOOGL", "TSLA"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STAI_API_BASE_URL", "https://api.example.com/"),
            ("STAI_TICKERS", "msft, nvda,,"),
            ("STAI_TIMEOUT_SECS", "5"),
            ("STAI_ENV", "production"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.tickers, vec!["MSFT", "NVDA"]);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.environment, "production");
    }

    #[test]
    fn test_vite_fallback() {
        let config =
            Config::from_lookup(lookup(&[("VITE_API_BASE_URL", "http://stai.local")])).unwrap();
        assert_eq!(config.api_base_url, "http://stai.local");
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup(&[("STAI_TIMEOUT_SECS", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: "STAI_TIMEOUT_SECS",
                value: "0".to_string()
            }
        );

        let err = Config::from_lookup(lookup(&[("STAI_TICKERS", " , ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("STAI_TICKERS"));
    }
}
