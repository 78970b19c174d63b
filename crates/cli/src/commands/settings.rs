//! Connection settings.
//!
//! # Usage
//!
//! ```bash
//! shop settings show
//! shop settings set-base-url https://shop.example.com
//! ```

use std::io::Write;

use serde::Serialize;
use shopfront_client::urls::sanitize_base_url;
use url::Url;

use super::{CommandError, Context};

#[derive(Debug, Serialize)]
struct SettingsView {
    base_url: String,
    stored_base_url: Option<String>,
    overridden: bool,
    home: Option<String>,
    signed_in: bool,
}

/// Show where requests go and whether a credential is stored.
pub fn show(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.client.session();
    let view = SettingsView {
        base_url: session.get_base_url(),
        stored_base_url: session.stored_base_url(),
        overridden: ctx.config.base_url_override.is_some(),
        home: ctx.config.home.as_ref().map(|h| h.display().to_string()),
        signed_in: session.get_credential().is_some(),
    };

    ctx.emit(&view, |out: &mut dyn Write| {
        writeln!(out, "Base URL:  {}", view.base_url)?;
        if view.overridden {
            writeln!(out, "           (from SHOPFRONT_API_BASE_URL)")?;
        }
        if let Some(stored) = &view.stored_base_url {
            writeln!(out, "Stored:    {stored}")?;
        }
        writeln!(
            out,
            "Storage:   {}",
            view.home.as_deref().unwrap_or("(memory only)")
        )?;
        writeln!(out, "Signed in: {}", if view.signed_in { "yes" } else { "no" })
    })
}

/// Check a base URL and return its sanitized form.
fn validate_base_url(raw: &str) -> Result<String, CommandError> {
    let sanitized = sanitize_base_url(raw);
    let parsed = Url::parse(&sanitized)
        .map_err(|e| CommandError::InvalidArgument(format!("invalid URL {raw}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(CommandError::InvalidArgument(format!(
            "invalid URL {raw}: expected http(s)://host"
        )));
    }
    Ok(sanitized)
}

/// Point the client at another backend. Admin only.
pub async fn set_base_url(ctx: &Context, raw: &str) -> Result<(), CommandError> {
    let sanitized = validate_base_url(raw)?;
    ctx.client.require_admin().await?;
    ctx.client
        .session()
        .set_base_url(&sanitized)
        .map_err(shopfront_client::ClientError::from)?;
    if ctx.config.base_url_override.is_some() {
        tracing::warn!("SHOPFRONT_API_BASE_URL is set and takes precedence over the stored URL");
    }
    ctx.done(&format!("Base URL set to {sanitized}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url(" shop.example.com:8080/ ").unwrap(),
            "http://shop.example.com:8080"
        );
        assert_eq!(
            validate_base_url("HTTPS://shop.example.com").unwrap(),
            "HTTPS://shop.example.com"
        );
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("http://exa mple.com").is_err());
    }
}
