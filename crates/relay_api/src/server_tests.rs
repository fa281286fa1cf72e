//! Tests for server module

use super::*;
use axum::{body::Body, extract::Request, http::StatusCode};
use tower::ServiceExt;

use crate::{RelayConfig, WEBHOOK_PATH};

#[test]
fn test_default_config() {
    let config = ApiConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.host, "0.0.0.0");
}

#[test]
fn test_socket_addr() {
    let config = ApiConfig {
        port: 9000,
        host: "127.0.0.1".to_string(),
    };
    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
}

#[test]
fn test_socket_addr_rejects_hostname() {
    let config = ApiConfig {
        port: 9000,
        host: "localhost".to_string(),
    };
    let err = config.socket_addr().unwrap_err();
    assert!(err.to_string().contains("API_HOST"));
}

#[test]
fn test_server_creation() {
    let state = AppState::new(RelayConfig::default());
    let server = ApiServer::new(ApiConfig::default(), state);
    let _router = server.router();
}

#[tokio::test]
async fn test_server_router_serves_webhook_route() {
    let server = ApiServer::new(ApiConfig::default(), AppState::new(RelayConfig::default()));
    let request = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .body(Body::empty())
        .unwrap();

    let response = server.router().oneshot(request).await.unwrap();

    // No signing secret configured.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
