//! Notification delivery to the Telegram Bot API.
//!
//! A delivery is a single `sendMessage` call. The Bot API reports errors both
//! through the HTTP status and through an `ok` flag in the JSON body, so a
//! delivery only succeeds when the status is 2xx *and* `ok` is `true`. There
//! is no retry: callers get one attempt and a boolean outcome.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

/// Default Bot API base URL.
pub const TELEGRAM_DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Reasons a delivery attempt failed.
///
/// Messages never include the request URL, which embeds the bot token.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The configured base URL could not be parsed.
    #[error("Invalid messaging API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API answered and refused the message.
    #[error("Messaging API rejected the message (status {status}): {description}")]
    Rejected { status: u16, description: String },

    /// The API answered with a failure whose body could not be parsed.
    #[error("Messaging API returned status {status} with an unreadable body")]
    UnreadableResponse { status: u16 },
}

/// Text formatting mode understood by the Bot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// One notification to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub text: String,

    /// Omitted from the request entirely when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

impl OutboundMessage {
    /// A MarkdownV2 message, the format produced by [`crate::format_event`].
    pub fn markdown(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: Some(ParseMode::MarkdownV2),
        }
    }
}

/// `sendMessage` response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Delivers notifications to a chat.
///
/// Implementations report ordinary failures as `false` and never panic;
/// callers treat every failure the same way.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Attempts delivery once. Returns `true` if the chat accepted the message.
    async fn send(&self, message: &OutboundMessage) -> bool;
}

/// [`MessageDispatcher`] backed by the Telegram Bot API.
pub struct TelegramDispatcher {
    client: reqwest::Client,
    base_url: Url,
    bot_token: SecretString,
}

impl TelegramDispatcher {
    /// Creates a dispatcher for the given Bot API base URL and bot token.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL.
    pub fn new(base_url: &str, bot_token: SecretString) -> Result<Self, DispatchError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| DispatchError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            bot_token,
        })
    }

    /// Builds the method URL, `{base}/bot{token}/{method}`.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.bot_token.expose_secret(),
            method
        )
    }

    /// Attempts delivery once and reports why it failed.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Transport`] if no response was received
    /// - [`DispatchError::Rejected`] for a non-2xx status or `ok: false`
    /// - [`DispatchError::UnreadableResponse`] if a response body could not be
    ///   parsed
    pub async fn try_send(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(message)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url()))?;

        let parsed = match serde_json::from_str::<ApiResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(DispatchError::UnreadableResponse {
                    status: status.as_u16(),
                })
            }
        };

        if status.is_success() && parsed.ok {
            return Ok(());
        }

        Err(DispatchError::Rejected {
            status: parsed.error_code.unwrap_or(status.as_u16()),
            description: parsed
                .description
                .unwrap_or_else(|| "no description".to_string()),
        })
    }
}

#[async_trait]
impl MessageDispatcher for TelegramDispatcher {
    async fn send(&self, message: &OutboundMessage) -> bool {
        match self.try_send(message).await {
            Ok(()) => {
                tracing::info!(chat_id = %message.chat_id, "Notification delivered");
                true
            }
            Err(e) => {
                tracing::warn!(chat_id = %message.chat_id, error = %e, "Notification delivery failed");
                false
            }
        }
    }
}
