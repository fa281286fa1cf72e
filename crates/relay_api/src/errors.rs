//! Error handling and HTTP error conversion
//!
//! Every way the webhook pipeline can stop early is a [`WebhookError`]. The
//! conversion to an HTTP response happens here, at the boundary, so handlers
//! only ever return `Result<_, WebhookError>`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use relay_core::WebhookOutcome;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Standard error response for all API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional context (optional, type varies by error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Reasons a webhook request is not relayed.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Method {0} is not allowed; only POST is accepted")]
    MethodNotAllowed(String),

    #[error("Webhook signing secret is not configured")]
    MissingSecret,

    #[error("Signature header is missing")]
    MissingSignature,

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Signature does not match request body")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Notification could not be delivered")]
    DispatchFailed,
}

impl WebhookError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::MissingSecret
            | WebhookError::BodyRead(_)
            | WebhookError::DispatchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Metric label for this error.
    pub fn outcome(&self) -> WebhookOutcome {
        match self {
            WebhookError::MethodNotAllowed(_) => WebhookOutcome::MethodNotAllowed,
            WebhookError::MissingSecret => WebhookOutcome::Misconfigured,
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                WebhookOutcome::Unauthorized
            }
            WebhookError::BodyRead(_) => WebhookOutcome::BodyReadFailed,
            WebhookError::MalformedPayload(_) => WebhookOutcome::MalformedPayload,
            WebhookError::DispatchFailed => WebhookOutcome::DispatchFailed,
        }
    }

    /// Client-facing error body.
    ///
    /// Both signature failures share one body so a caller cannot tell a
    /// missing header from a wrong digest.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message) = match self {
            WebhookError::MethodNotAllowed(_) => ("MethodNotAllowed", "Method not allowed"),
            WebhookError::MissingSecret => ("ConfigurationError", "Server misconfigured"),
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                ("AuthenticationError", "Invalid signature")
            }
            WebhookError::BodyRead(_) => ("InternalError", "Failed to read request body"),
            WebhookError::MalformedPayload(_) => ("ValidationError", "Invalid JSON payload"),
            WebhookError::DispatchFailed => ("DeliveryError", "Failed to send notification"),
        };

        ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_error(&self, status);

        let mut response = (status, Json(self.to_error_response())).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

/// Log error with appropriate level based on HTTP status
fn log_error(error: &WebhookError, status: StatusCode) {
    if status.is_server_error() {
        tracing::error!(status = %status, outcome = %error.outcome(), "Webhook rejected: {}", error);
    } else {
        tracing::warn!(status = %status, outcome = %error.outcome(), "Webhook rejected: {}", error);
    }
}
