//! Tests for error handling and HTTP conversion

use super::*;
use axum::body::to_bytes;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn malformed() -> WebhookError {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    WebhookError::MalformedPayload(err)
}

#[test]
fn test_status_mapping() {
    assert_eq!(
        WebhookError::MethodNotAllowed("GET".into()).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
        WebhookError::MissingSecret.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        WebhookError::MissingSignature.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        WebhookError::InvalidSignature.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        WebhookError::BodyRead("reset".into()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(malformed().status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        WebhookError::DispatchFailed.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_outcome_mapping() {
    assert_eq!(
        WebhookError::MissingSecret.outcome(),
        WebhookOutcome::Misconfigured
    );
    assert_eq!(
        WebhookError::MissingSignature.outcome(),
        WebhookOutcome::Unauthorized
    );
    assert_eq!(malformed().outcome(), WebhookOutcome::MalformedPayload);
    assert_eq!(
        WebhookError::DispatchFailed.outcome(),
        WebhookOutcome::DispatchFailed
    );
}

#[tokio::test]
async fn test_signature_failures_share_one_body() {
    let missing = WebhookError::MissingSignature.into_response();
    let invalid = WebhookError::InvalidSignature.into_response();

    assert_eq!(missing.status(), invalid.status());
    assert_eq!(body_json(missing).await, body_json(invalid).await);
}

#[tokio::test]
async fn test_method_not_allowed_sets_allow_header() {
    let response = WebhookError::MethodNotAllowed("GET".into()).into_response();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
}

#[tokio::test]
async fn test_error_body_uses_envelope() {
    let response = malformed().into_response();

    let json = body_json(response).await;

    assert_eq!(json["error"]["code"], "ValidationError");
    assert_eq!(json["error"]["message"], "Invalid JSON payload");
    assert!(json["error"].get("details").is_none());
}

#[tokio::test]
async fn test_body_read_detail_is_not_exposed() {
    let response = WebhookError::BodyRead("connection reset by peer".into()).into_response();

    let json = body_json(response).await;

    assert!(!json.to_string().contains("connection reset"));
}
