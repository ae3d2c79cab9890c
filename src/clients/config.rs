//! Client configuration.
//!
//! Provides the immutable configuration for the SolarWinds Observability
//! API client. Configuration is loaded once from environment variables at
//! startup and passed into the client's constructor, so the client stays
//! independently testable with an injected configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.solarwinds.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the SolarWinds Observability API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwoConfig {
    /// Base URL for the API (e.g., "https://api.solarwinds.com").
    pub api_url: String,

    /// Bearer token for API authentication.
    pub api_token: String,

    /// Organization ID. Accepted for forward compatibility; not sent on
    /// any current request.
    pub organization_id: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl SwoConfig {
    /// Create a configuration with the given token and defaults for
    /// everything else.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: api_token.into(),
            organization_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SWO_API_URL`: API base URL (default: https://api.solarwinds.com)
    /// - `SWO_API_TOKEN`: bearer token (required)
    /// - `SWO_ORG_ID`: organization ID (optional)
    /// - `SWO_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("SWO_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("SWO_API_TOKEN".to_string()))?;

        Ok(Self {
            api_url: std::env::var("SWO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_token,
            organization_id: std::env::var("SWO_ORG_ID").ok(),
            timeout_secs: std::env::var("SWO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.is_empty() {
            return Err(ConfigError::MissingEnvVar("SWO_API_TOKEN".to_string()));
        }
        if self.api_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SWO_API_URL".to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
