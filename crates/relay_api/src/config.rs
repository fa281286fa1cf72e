//! Relay configuration.
//!
//! Configuration is read once at process start and passed to the handlers
//! through [`crate::AppState`]. Nothing below the binary reads the environment
//! directly; loaders take a `lookup` function so tests can supply fixed values.
//!
//! # Environment Variables
//!
//! - `WEBHOOK_SECRET`: signing secret shared with the provider (secret)
//! - `TELEGRAM_BOT_TOKEN`: bot credential (secret)
//! - `TELEGRAM_CHAT_ID`: destination chat
//! - `TELEGRAM_API_BASE_URL`: Bot API base (default: `https://api.telegram.org`)
//! - `SIGNATURE_HEADER`: inbound signature header (default: `x-vercel-signature`)
//! - `SIGNATURE_ALGORITHM`: `sha1` or `sha256` (default: `sha1`)
//! - `SIGNATURE_FORMAT`: `bare` or `prefixed` (default: `bare`)
//! - `MAX_BODY_BYTES`: inbound body size cap (default: 1 MiB)
//! - `API_HOST` / `API_PORT`: bind address (default: `0.0.0.0:8080`)

use axum::http::HeaderName;
use relay_core::{
    SecretResolutionError, SecretResolver, SignatureAlgorithm, SignatureFormat, SignatureScheme,
    TELEGRAM_DEFAULT_API_BASE_URL,
};
use secrecy::SecretString;
use thiserror::Error;

use crate::server::ApiConfig;
use crate::DEFAULT_PORT;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Secret reference for the signing secret
pub const WEBHOOK_SECRET_REF: &str = "WEBHOOK_SECRET";

/// Secret reference for the bot credential
pub const BOT_TOKEN_REF: &str = "TELEGRAM_BOT_TOKEN";

/// Default inbound signature header
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-vercel-signature";

/// Default inbound body size cap
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors raised while loading configuration at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting was present but could not be parsed.
    #[error("Invalid value for {variable}: {reason}")]
    InvalidValue { variable: String, reason: String },

    /// A secret source failed for a reason other than the secret being absent.
    #[error("Failed to resolve secret: {0}")]
    Secret(#[from] SecretResolutionError),
}

/// Settings used by the webhook pipeline.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Shared signing secret. Absence is a misconfiguration reported per request.
    pub webhook_secret: Option<SecretString>,

    /// Bot credential for the messaging API.
    pub bot_token: Option<SecretString>,

    /// Destination chat. Absence downgrades deliveries to acknowledgements.
    pub chat_id: Option<String>,

    /// Messaging API base URL.
    pub telegram_api_base_url: String,

    /// Header carrying the provider's signature.
    pub signature_header: HeaderName,

    /// Expected signing convention.
    pub signature_scheme: SignatureScheme,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            bot_token: None,
            chat_id: None,
            telegram_api_base_url: TELEGRAM_DEFAULT_API_BASE_URL.to_string(),
            signature_header: HeaderName::from_static(DEFAULT_SIGNATURE_HEADER),
            signature_scheme: SignatureScheme::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RelayConfig {
    /// Loads the relay configuration.
    ///
    /// Plain settings come from `lookup`; the signing secret and bot token come
    /// from `resolver`. A secret that is simply absent loads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable settings and
    /// [`ConfigError::Secret`] when a secret source fails outright.
    pub async fn load<F>(lookup: F, resolver: &dyn SecretResolver) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let webhook_secret = optional_secret(resolver, WEBHOOK_SECRET_REF).await?;
        let bot_token = optional_secret(resolver, BOT_TOKEN_REF).await?;

        let chat_id = non_empty(lookup("TELEGRAM_CHAT_ID"));

        let telegram_api_base_url = non_empty(lookup("TELEGRAM_API_BASE_URL"))
            .unwrap_or(defaults.telegram_api_base_url);

        let signature_header = match non_empty(lookup("SIGNATURE_HEADER")) {
            Some(raw) => HeaderName::from_bytes(raw.to_ascii_lowercase().as_bytes())
                .map_err(|e| invalid("SIGNATURE_HEADER", e))?,
            None => defaults.signature_header,
        };

        let algorithm = match non_empty(lookup("SIGNATURE_ALGORITHM")) {
            Some(raw) => raw
                .parse::<SignatureAlgorithm>()
                .map_err(|e| invalid("SIGNATURE_ALGORITHM", e))?,
            None => SignatureAlgorithm::default(),
        };

        let format = match non_empty(lookup("SIGNATURE_FORMAT")) {
            Some(raw) => raw
                .parse::<SignatureFormat>()
                .map_err(|e| invalid("SIGNATURE_FORMAT", e))?,
            None => SignatureFormat::default(),
        };

        let max_body_bytes = match non_empty(lookup("MAX_BODY_BYTES")) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("MAX_BODY_BYTES", "expected a positive integer"))?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            webhook_secret,
            bot_token,
            chat_id,
            telegram_api_base_url,
            signature_header,
            signature_scheme: SignatureScheme::new(algorithm, format),
            max_body_bytes,
        })
    }

    /// Logs the loaded configuration, naming missing pieces without printing
    /// secret values.
    pub fn log_summary(&self) {
        if self.webhook_secret.is_none() {
            tracing::error!(
                secret = WEBHOOK_SECRET_REF,
                "Signing secret is not configured; every webhook will be rejected with 500"
            );
        }
        if self.bot_token.is_none() || self.chat_id.is_none() {
            tracing::warn!(
                bot_token_configured = self.bot_token.is_some(),
                chat_id_configured = self.chat_id.is_some(),
                "Notification destination incomplete; verified webhooks will only be acknowledged"
            );
        }
        tracing::info!(
            signature_header = %self.signature_header,
            algorithm = %self.signature_scheme.algorithm,
            format = ?self.signature_scheme.format,
            max_body_bytes = self.max_body_bytes,
            "Relay configuration loaded"
        );
    }
}

/// Loads the bind address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `API_PORT` is not a valid port.
pub fn load_api_config<F>(lookup: F) -> Result<ApiConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match non_empty(lookup("API_PORT")) {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|e| invalid("API_PORT", e))?,
        None => DEFAULT_PORT,
    };
    let host = non_empty(lookup("API_HOST")).unwrap_or_else(|| ApiConfig::default().host);
    Ok(ApiConfig { port, host })
}

async fn optional_secret(
    resolver: &dyn SecretResolver,
    reference: &str,
) -> Result<Option<SecretString>, ConfigError> {
    match resolver.resolve_secret(reference).await {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretResolutionError::NotFound { .. }) => Ok(None),
        Err(e) => Err(ConfigError::Secret(e)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(variable: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        variable: variable.to_string(),
        reason: reason.to_string(),
    }
}
