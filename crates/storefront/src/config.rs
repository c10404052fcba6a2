//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUQ_API_BASE_URL` - Base URL of the remote storefront API
//!
//! ## Optional
//! - `SOUQ_API_VERSION` - API path version segment (default: vi)
//! - `SOUQ_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Remote storefront API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the remote API, without the `/api/...` path.
    pub base_url: Url,
    /// Version segment used by most endpoints. The deployed backend mounts
    /// everything under `vi` except hero banners, which live under `v1`.
    pub api_version: String,
    /// Per-request timeout applied to the HTTP client.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("SOUQ_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOUQ_API_BASE_URL".to_string(), e.to_string())
            })?;
        let api_version = get_env_or_default("SOUQ_API_VERSION", "vi");
        let timeout_secs = get_env_or_default("SOUQ_API_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOUQ_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            api_version,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a config directly, for tests and embedding callers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string())
        })?;
        Ok(Self {
            base_url,
            api_version: "vi".to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Endpoint URL for a resource under the standard version segment.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_version,
            path.trim_start_matches('/')
        )
    }

    /// Endpoint URL for the hero banner resource.
    ///
    /// Hero banners are the one resource the backend mounts under `v1`.
    #[must_use]
    pub fn hero_endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v1/hero/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
