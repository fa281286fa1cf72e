//! DeployRelay core
//!
//! Business logic for relaying hosting-provider deployment webhooks to a chat
//! channel. The crate is HTTP-framework agnostic; `relay_api` owns the inbound
//! server and calls into the pieces exposed here:
//!
//! - [`signature`]: HMAC verification of the raw webhook body
//! - [`event`]: the webhook payload model
//! - [`formatter`] and [`markdown`]: event → MarkdownV2 notification text
//! - [`dispatcher`]: delivery of the notification to the Telegram Bot API
//! - [`secrets`]: resolution of signing secrets and bot credentials
//! - [`delivery_metrics`]: metrics recording for webhooks and deliveries

pub mod delivery_metrics;
pub mod dispatcher;
pub mod event;
pub mod formatter;
pub mod markdown;
pub mod secrets;
pub mod signature;

pub use delivery_metrics::{
    DeliveryMetrics, NoOpDeliveryMetrics, PrometheusDeliveryMetrics, WebhookOutcome,
};
pub use dispatcher::{
    DispatchError, MessageDispatcher, OutboundMessage, ParseMode, TelegramDispatcher,
    TELEGRAM_DEFAULT_API_BASE_URL,
};
pub use event::{EventKind, WebhookEvent};
pub use formatter::format_event;
pub use markdown::{escape_markdown, escape_optional};
pub use secrets::{
    EnvironmentSecretResolver, FilesystemSecretResolver, SecretResolutionError, SecretResolver,
};
pub use signature::{
    compute_signature, verify_signature, SignatureAlgorithm, SignatureError, SignatureFormat,
    SignatureScheme,
};
