//! DeployRelay HTTP service
//!
//! Receives signed deployment webhooks, verifies them, and relays a formatted
//! notification to a Telegram chat.
//!
//! # Architecture
//!
//! This crate exists in the HTTP layer and handles:
//! - Raw body capture and the webhook pipeline (`handlers`)
//! - Error mapping from pipeline failures to HTTP (`errors`)
//! - Configuration loading (`config`)
//! - Routing, middleware and server lifecycle
//!
//! Signature verification, formatting and delivery live in `relay_core`.

use std::sync::Arc;

use relay_core::{DeliveryMetrics, MessageDispatcher, NoOpDeliveryMetrics};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

// Re-export key types for convenience
pub use config::{ConfigError, RelayConfig};
pub use errors::{ErrorResponse, WebhookError};
pub use server::{ApiConfig, ApiServer};

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Path the provider delivers webhooks to
pub const WEBHOOK_PATH: &str = "/webhook";

/// Application state shared across handlers.
///
/// Everything in here is built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration
    pub config: Arc<RelayConfig>,

    /// Notification sender; `None` when no bot credential is configured
    pub dispatcher: Option<Arc<dyn MessageDispatcher>>,

    /// Metrics sink
    pub metrics: Arc<dyn DeliveryMetrics>,

    /// Registry rendered by the `/metrics` endpoint
    pub registry: prometheus::Registry,
}

impl AppState {
    /// Create application state with no dispatcher and no-op metrics.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: None,
            metrics: Arc::new(NoOpDeliveryMetrics::new()),
            registry: prometheus::Registry::new(),
        }
    }

    /// Set the notification dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn MessageDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Set the metrics sink and the registry it reports into.
    pub fn with_metrics(
        mut self,
        metrics: Arc<dyn DeliveryMetrics>,
        registry: prometheus::Registry,
    ) -> Self {
        self.metrics = metrics;
        self.registry = registry;
        self
    }
}
