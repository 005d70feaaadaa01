//! Shared utilities for StAI
//!
//! This crate provides common functionality used across the StAI workspace,
//! including logging setup and configuration loading.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
