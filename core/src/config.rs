//! Client configuration.
//!
//! Environment variables:
//! - `BOARD_API_URL`: base URL, default `http://127.0.0.1:8000`
//! - `BOARD_API_TOKEN`: auth token attached to every request (optional)
//! - `BOARD_API_TIMEOUT_SECS`: per-request timeout in seconds, default 30

use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("BOARD_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = get("BOARD_API_TOKEN");
        let timeout = match get("BOARD_API_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            token,
            timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ApiError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ApiError::Config(format!(
            "BOARD_API_TIMEOUT_SECS must be a positive integer, got {raw:?}"
        ))),
    }
}
