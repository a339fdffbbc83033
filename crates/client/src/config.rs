//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_API_BASE_URL` - Base URL of the store REST API
//!
//! ## Optional
//! - `STORE_SESSION_TOKEN` - Bearer token; absent means guest session
//! - `STORE_REQUEST_TIMEOUT_SECS` - Request timeout (default: 10)
//! - `WISHLIST_STORAGE_PATH` - Device wishlist slot (default:
//!   `wishlist_items_v1.json`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::SessionToken;

/// Default request timeout, matching the store API's expectations.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default device slot name for the guest wishlist.
pub const DEFAULT_WISHLIST_PATH: &str = "wishlist_items_v1.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Synchronization engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the store REST API
    pub api_base_url: Url,
    /// Per-request timeout; expiry surfaces as a timeout failure
    pub request_timeout: Duration,
    /// Path of the device-local wishlist slot (guest sessions)
    pub wishlist_path: PathBuf,
    /// Bearer token for the current session, if any
    pub session_token: Option<SessionToken>,
}

impl SyncConfig {
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

        let api_base_url = get_required_env("STORE_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_API_BASE_URL".to_string(), e.to_string())
            })?;

        let request_timeout = match get_optional_env("STORE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let wishlist_path = PathBuf::from(
            get_optional_env("WISHLIST_STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_WISHLIST_PATH.to_string()),
        );

        let session_token = get_optional_env("STORE_SESSION_TOKEN").map(SessionToken::new);

        Ok(Self {
            api_base_url,
            request_timeout,
            wishlist_path,
            session_token,
        })
    }

    /// Build a config programmatically (tests, embedding).
    #[must_use]
    pub fn new(api_base_url: Url, wishlist_path: PathBuf) -> Self {
        Self {
            api_base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            wishlist_path,
            session_token: None,
        }
    }

    /// Replace the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session(mut self, token: SessionToken) -> Self {
        self.session_token = Some(token);
        self
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SyncConfig::new(
            "http://localhost:4000/api".parse().unwrap(),
            PathBuf::from("wishlist.json"),
        );
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.session_token.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SyncConfig::new(
            "http://localhost:4000/api".parse().unwrap(),
            PathBuf::from("wishlist.json"),
        )
        .with_timeout(Duration::from_millis(250))
        .with_session(SessionToken::new("tok"));

        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert!(config.session_token.is_some());
    }

    #[test]
    fn test_debug_redacts_session_token() {
        let config = SyncConfig::new(
            "http://localhost:4000/api".parse().unwrap(),
            PathBuf::from("wishlist.json"),
        )
        .with_session(SessionToken::new("super-secret"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }
}
