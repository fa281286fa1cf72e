//! Tests for routes module

use super::*;
use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
};
use tower::ServiceExt;

use crate::RelayConfig;

fn app() -> Router {
    create_router(AppState::new(RelayConfig::default()))
}

#[tokio::test]
async fn test_health_route() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_route_uses_text_exposition() {
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn test_webhook_route_accepts_any_method() {
    for method in ["GET", "PUT", "DELETE"] {
        let request = Request::builder()
            .method(method)
            .uri(WEBHOOK_PATH)
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        // Routed to the handler, which owns the 405 and its Allow header.
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .contains_key(&api_middleware::REQUEST_ID_HEADER));
}
