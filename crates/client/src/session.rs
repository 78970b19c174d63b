//! Session state: the bearer credential and the configured backend origin.
//!
//! A [`Session`] binds two [`Storage`] backends. The cookie store holds the
//! credential as a JSON record with an expiry; the local store holds the
//! base URL setting and, for sessions written by older clients, a plain
//! credential that is migrated into the cookie store on first read.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError};
use crate::urls::sanitize_base_url;

/// Cookie store key for the credential record.
pub const CREDENTIAL_KEY: &str = "auth_token";

/// Local store key older clients kept the credential under.
pub const LEGACY_CREDENTIAL_KEY: &str = "auth_token";

/// Local store key for the configured base URL.
pub const BASE_URL_KEY: &str = "api_base_url";

/// How long a stored credential stays valid (7 days).
pub const CREDENTIAL_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CredentialRecord {
    fn fresh(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            expires_at: Utc::now() + Duration::days(CREDENTIAL_LIFETIME_DAYS),
        }
    }
}

/// Credential and base URL state for one client.
///
/// Cloning shares the underlying stores.
#[derive(Debug, Clone, Default)]
pub struct Session {
    cookies: Option<Arc<dyn Storage>>,
    local: Option<Arc<dyn Storage>>,
    base_url_override: Option<String>,
}

impl Session {
    /// Session over a cookie store and a local store.
    #[must_use]
    pub fn new(cookies: Arc<dyn Storage>, local: Arc<dyn Storage>) -> Self {
        Self {
            cookies: Some(cookies),
            local: Some(local),
            base_url_override: None,
        }
    }

    /// Session without persistent storage.
    ///
    /// Reads find nothing and writes are dropped.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Pin the base URL, ignoring the stored setting.
    #[must_use]
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        self.base_url_override = base_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Whether this session has persistent storage.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.cookies.is_some()
    }

    /// The stored credential, if any.
    ///
    /// Expired or unreadable records are removed and reported as absent.
    /// When the cookie store has nothing, a legacy credential from the
    /// local store is moved over and returned.
    #[must_use]
    pub fn get_credential(&self) -> Option<SecretString> {
        let cookies = self.cookies.as_deref()?;

        match cookies.get(CREDENTIAL_KEY) {
            Ok(Some(raw)) => {
                if let Some(value) = decode_record(cookies, &raw) {
                    return Some(value);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                return None;
            }
        }

        self.migrate_legacy_credential()
    }

    fn migrate_legacy_credential(&self) -> Option<SecretString> {
        let local = self.local.as_deref()?;
        let legacy = match local.get(LEGACY_CREDENTIAL_KEY) {
            Ok(Some(value)) if !value.trim().is_empty() => value,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read legacy credential");
                return None;
            }
        };

        debug!("Migrating legacy credential to cookie store");
        match self.set_credential(&legacy) {
            Ok(()) => {
                if let Err(e) = local.remove(LEGACY_CREDENTIAL_KEY) {
                    warn!(error = %e, "Failed to remove legacy credential");
                }
            }
            // The legacy copy stays so the next read can retry.
            Err(e) => warn!(error = %e, "Failed to migrate legacy credential"),
        }
        Some(SecretString::from(legacy))
    }

    /// Store a credential for [`CREDENTIAL_LIFETIME_DAYS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie store cannot be written.
    pub fn set_credential(&self, token: &str) -> Result<(), StorageError> {
        let Some(cookies) = self.cookies.as_deref() else {
            return Ok(());
        };
        let record = serde_json::to_string(&CredentialRecord::fresh(token))
            .map_err(|source| StorageError::Encode { source })?;
        cookies.set(CREDENTIAL_KEY, &record)
    }

    /// Forget the credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie store cannot be written.
    pub fn clear_credential(&self) -> Result<(), StorageError> {
        match self.cookies.as_deref() {
            Some(cookies) => cookies.remove(CREDENTIAL_KEY),
            None => Ok(()),
        }
    }

    /// The sanitized backend origin.
    ///
    /// Precedence: the override, then the stored setting, then the
    /// default. A failed read falls back to the default.
    #[must_use]
    pub fn get_base_url(&self) -> String {
        if let Some(url) = &self.base_url_override {
            return sanitize_base_url(url);
        }
        let stored = self.local.as_deref().and_then(|local| {
            local
                .get(BASE_URL_KEY)
                .inspect_err(|e| warn!(error = %e, "Failed to read base URL setting"))
                .ok()
                .flatten()
        });
        sanitize_base_url(stored.as_deref().unwrap_or_default())
    }

    /// Store a base URL as given. It is sanitized on read.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be written.
    pub fn set_base_url(&self, url: &str) -> Result<(), StorageError> {
        match self.local.as_deref() {
            Some(local) => local.set(BASE_URL_KEY, url),
            None => Ok(()),
        }
    }

    /// The stored base URL setting, unsanitized.
    #[must_use]
    pub fn stored_base_url(&self) -> Option<String> {
        self.local
            .as_deref()
            .and_then(|local| local.get(BASE_URL_KEY).ok().flatten())
    }
}

/// Decode a cookie record, removing it when it is expired or corrupt.
fn decode_record(cookies: &dyn Storage, raw: &str) -> Option<SecretString> {
    let usable = match serde_json::from_str::<CredentialRecord>(raw) {
        Ok(record) if record.expires_at <= Utc::now() => {
            debug!("Stored credential expired");
            None
        }
        Ok(record) if record.value.is_empty() => None,
        Ok(record) => Some(SecretString::from(record.value)),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable credential record");
            None
        }
    };

    if usable.is_none()
        && let Err(e) = cookies.remove(CREDENTIAL_KEY)
    {
        warn!(error = %e, "Failed to remove stale credential");
    }
    usable
}

/// Expose a credential for an `Authorization` header.
pub(crate) fn bearer(credential: &SecretString) -> String {
    format!("Bearer {}", credential.expose_secret())
}
