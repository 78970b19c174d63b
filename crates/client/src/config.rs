//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_HOME` - Directory for `cookies.json` and `local.json`
//!   (default: `$HOME/.config/shopfront`; an empty value disables storage)
//! - `SHOPFRONT_API_BASE_URL` - Backend origin, overriding the stored setting
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: none)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::session::Session;
use crate::storage::FileStorage;

/// File name of the credential store.
pub const COOKIES_FILE: &str = "cookies.json";

/// File name of the settings store.
pub const LOCAL_FILE: &str = "local.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Storage directory; `None` keeps the session in memory only
    pub home: Option<PathBuf>,
    /// Base URL that takes precedence over the stored setting
    pub base_url_override: Option<String>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let home = match get_optional_env("SHOPFRONT_HOME") {
            Some(dir) if dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => default_home(),
        };

        let timeout = get_optional_env("SHOPFRONT_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout("SHOPFRONT_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?;

        Ok(Self {
            home,
            base_url_override: get_optional_env("SHOPFRONT_API_BASE_URL"),
            timeout,
        })
    }

    /// Build the session this configuration describes.
    #[must_use]
    pub fn session(&self) -> Session {
        let session = self.home.as_ref().map_or_else(Session::ephemeral, |home| {
            Session::new(
                Arc::new(FileStorage::private(home.join(COOKIES_FILE))),
                Arc::new(FileStorage::new(home.join(LOCAL_FILE))),
            )
        });
        session.with_base_url_override(self.base_url_override.clone())
    }
}

fn default_home() -> Option<PathBuf> {
    get_optional_env("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("shopfront"))
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than 0".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
