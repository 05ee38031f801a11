//! Application configuration
//!
//! Read from the process environment:
//!
//! - `WOLFRAM_ALPHA_APP_ID` (required for live lookups)
//! - `WOLFRAM_ALPHA_BASE_URL` (optional, defaults to the public v2 endpoint)

use reqwest::Url;

/// Public Wolfram|Alpha v2 query endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.wolframalpha.com/v2/query";

/// Variable holding the Wolfram|Alpha app id
pub const APP_ID_VAR: &str = "WOLFRAM_ALPHA_APP_ID";

/// Variable overriding the endpoint
pub const BASE_URL_VAR: &str = "WOLFRAM_ALPHA_BASE_URL";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No app id in the environment
    #[error("Missing WOLFRAM_ALPHA_APP_ID environment variable")]
    MissingAppId,

    /// The endpoint override is not an absolute http(s) URL
    #[error("Invalid WOLFRAM_ALPHA_BASE_URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Settings for the live environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeTimeConfig {
    /// Wolfram|Alpha app id
    pub app_id: String,
    /// Query endpoint
    pub base_url: String,
}

impl PrimeTimeConfig {
    /// Configuration for `app_id` against the public endpoint
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at another endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns `MissingAppId` when `WOLFRAM_ALPHA_APP_ID` is unset or blank,
    /// and `InvalidBaseUrl` for a malformed endpoint override.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`PrimeTimeConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_id = lookup(APP_ID_VAR)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingAppId)?;

        let mut config = Self::new(app_id);
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            validate_base_url(&base_url)?;
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}

fn validate_base_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}
