//! HTTP routing configuration
//!
//! # Route Structure
//!
//! - ANY  /webhook - Provider webhook (non-POST answered with 405)
//! - GET  /health  - Health check
//! - GET  /metrics - Prometheus metrics

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{handlers, middleware as api_middleware, AppState, WEBHOOK_PATH};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Create the complete router with all routes configured.
///
/// Headers are kept out of the request spans because the signature header
/// would otherwise be logged.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(false))
        .on_response(DefaultOnResponse::new().include_headers(false));

    // Configure request timeout (30 seconds)
    let timeout_layer = TimeoutLayer::new(Duration::from_secs(30));

    Router::new()
        .route(WEBHOOK_PATH, any(handlers::receive_webhook))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(timeout_layer)
        .layer(trace_layer)
        .with_state(state)
}
