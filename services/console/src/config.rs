//! services/console/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: Level,
    /// Optional deadline for each query round-trip. Unset means no deadline.
    pub request_timeout: Option<Duration>,
    pub stats_refresh: Duration,
    pub search_limit: u32,
    pub top_performers_limit: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Backend Settings ---
        let api_base_url = std::env::var("API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("API_BASE_URL".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Timing Settings ---
        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(parse_u64("REQUEST_TIMEOUT_SECS", &raw)?)),
            Err(_) => None,
        };

        let stats_refresh = match std::env::var("STATS_REFRESH_SECS") {
            Ok(raw) => Duration::from_secs(parse_u64("STATS_REFRESH_SECS", &raw)?),
            Err(_) => Duration::from_secs(30),
        };

        // --- Load Display Limits ---
        let search_limit = match std::env::var("SEARCH_LIMIT") {
            Ok(raw) => parse_u32("SEARCH_LIMIT", &raw)?,
            Err(_) => 10,
        };
        let top_performers_limit = match std::env::var("TOP_PERFORMERS_LIMIT") {
            Ok(raw) => parse_u32("TOP_PERFORMERS_LIMIT", &raw)?,
            Err(_) => 5,
        };

        Ok(Self {
            api_base_url,
            log_level,
            request_timeout,
            stats_refresh,
            search_limit,
            top_performers_limit,
        })
    }
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

fn parse_u32(name: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.parse::<u32>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
