//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use reelpost_core::Config;

/// Validate critical configuration values
///
/// Hard errors come from [`Config::validate`]; the checks here only warn about
/// hosted settings worth tightening and setups that start but cannot upload.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_hosted() && config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!(
            "CORS allows all origins (*) in hosted mode - set CORS_ORIGINS to restrict it"
        );
    }

    if config.client_secrets().is_none() {
        tracing::warn!(
            "No OAuth client secrets found - sign-in will fail until GOOGLE_CLIENT_SECRET \
            or a client_secret*.json file is provided"
        );
    }

    if config.is_hosted() && !config.redirect_uri().starts_with("https://") {
        tracing::warn!(
            redirect_uri = %config.redirect_uri(),
            "Hosted redirect URI is not HTTPS - the session cookie is marked Secure"
        );
    }

    tracing::info!(
        deployment = ?config.deployment(),
        port = config.server_port(),
        "Configuration validation passed"
    );
    Ok(())
}
