//! HTTP request handlers
//!
//! The webhook handler takes the whole [`Request`] and buffers the body
//! itself. The signature is computed over those exact bytes, so no JSON
//! extractor may run first.

use std::time::Instant;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use relay_core::{
    format_event, verify_signature, OutboundMessage, WebhookEvent, WebhookOutcome,
};
use serde::{Deserialize, Serialize};

use crate::{errors::WebhookError, AppState};

/// Body returned for a webhook that was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// `delivered` or `acknowledged`
    pub status: String,

    /// Human-readable summary
    pub message: String,
}

/// How a verified webhook was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// The notification was sent.
    Delivered,

    /// No destination is configured, so nothing was sent.
    Acknowledged,
}

impl Accepted {
    /// Metric label for this result.
    pub fn outcome(self) -> WebhookOutcome {
        match self {
            Accepted::Delivered => WebhookOutcome::Delivered,
            Accepted::Acknowledged => WebhookOutcome::Acknowledged,
        }
    }

    fn to_response_body(self) -> WebhookResponse {
        let (status, message) = match self {
            Accepted::Delivered => ("delivered", "Notification sent"),
            Accepted::Acknowledged => {
                ("acknowledged", "Webhook verified; no destination configured")
            }
        };
        WebhookResponse {
            status: status.to_string(),
            message: message.to_string(),
        }
    }
}

/// ANY /webhook
///
/// Verifies and relays one provider webhook. Every request records exactly
/// one `relay_webhooks_total` outcome.
pub async fn receive_webhook(State(state): State<AppState>, request: Request) -> Response {
    match process_webhook(&state, request).await {
        Ok(accepted) => {
            state.metrics.record_webhook(accepted.outcome());
            (StatusCode::OK, Json(accepted.to_response_body())).into_response()
        }
        Err(e) => {
            state.metrics.record_webhook(e.outcome());
            e.into_response()
        }
    }
}

async fn process_webhook(
    state: &AppState,
    request: Request,
) -> Result<Accepted, WebhookError> {
    if request.method() != Method::POST {
        return Err(WebhookError::MethodNotAllowed(request.method().to_string()));
    }

    let config = &state.config;
    let secret = config
        .webhook_secret
        .as_ref()
        .ok_or(WebhookError::MissingSecret)?;

    // A header that is not visible ASCII can never match a hex digest.
    let provided = match request.headers().get(&config.signature_header) {
        None => return Err(WebhookError::MissingSignature),
        Some(value) => value
            .to_str()
            .map(str::to_owned)
            .map_err(|_| WebhookError::InvalidSignature)?,
    };

    let body = to_bytes(request.into_body(), config.max_body_bytes)
        .await
        .map_err(|e| WebhookError::BodyRead(e.to_string()))?;

    if !verify_signature(&body, Some(&provided), secret, &config.signature_scheme) {
        return Err(WebhookError::InvalidSignature);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)?;
    tracing::info!(
        event_type = %event.kind,
        event_id = event.id.as_deref().unwrap_or("-"),
        "Verified webhook received"
    );

    let (chat_id, dispatcher) = match (&config.chat_id, &state.dispatcher) {
        (Some(chat_id), Some(dispatcher)) => (chat_id, dispatcher),
        _ => {
            tracing::warn!(
                event_type = %event.kind,
                "No notification destination configured; acknowledging without sending"
            );
            return Ok(Accepted::Acknowledged);
        }
    };

    let message = OutboundMessage::markdown(chat_id.clone(), format_event(&event));

    let started = Instant::now();
    let delivered = dispatcher.send(&message).await;
    let elapsed = started.elapsed();

    if delivered {
        state.metrics.record_delivery_success(elapsed);
        Ok(Accepted::Delivered)
    } else {
        state.metrics.record_delivery_failure(elapsed);
        Err(WebhookError::DispatchFailed)
    }
}

/// GET /health
///
/// Returns service health status with version and timestamp.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,

    /// Service version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Current timestamp (ISO 8601)
    pub timestamp: String,
}

/// GET /metrics
///
/// Prometheus text exposition of the registry in [`AppState`].
pub async fn metrics(State(state): State<AppState>) -> Response {
    let encoder = TextEncoder::new();
    let families = state.registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
