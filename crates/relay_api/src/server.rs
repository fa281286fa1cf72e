//! Relay server lifecycle
//!
//! Binds the webhook endpoint and its health and metrics routes, then serves
//! until CTRL+C or SIGTERM. In-flight deliveries finish before the process
//! exits.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;

use crate::{routes, AppState, DEFAULT_PORT};

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// Bind address, read from `API_HOST` / `API_PORT`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl ApiConfig {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an IP address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip = self
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid API_HOST '{}': {}", self.host, e))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

/// The relay's HTTP server.
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a server for `state` bound to `config`.
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// The webhook, health and metrics routes with tracing and timeout layers.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// Serve webhooks until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if `API_HOST` is not an IP address, the port cannot
    /// be bound, or the accept loop fails.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr()?;

        tracing::info!(address = %addr, "Relay listening for webhooks");

        let listener = TcpListener::bind(addr).await?;
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        tracing::info!("Relay stopped");

        Ok(())
    }
}

/// Resolves on CTRL+C or SIGTERM.
///
/// If a handler cannot be installed that branch never completes, and the
/// server keeps running until the other signal arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
