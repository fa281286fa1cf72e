//! DeployRelay server
//!
//! Main binary for running the webhook relay.
//!
//! # Environment Variables
//!
//! See [`relay_api::config`] for the relay settings. In addition:
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `LOG_FORMAT`: `json` for structured output, anything else for text
//! - `SECRETS_DIR`: read secrets from files in this directory instead of the
//!   environment

use std::{env, sync::Arc};

use relay_api::{config, AppState, ApiServer, RelayConfig};
use relay_core::{
    EnvironmentSecretResolver, FilesystemSecretResolver, PrometheusDeliveryMetrics,
    SecretResolver, TelegramDispatcher,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let lookup = |key: &str| env::var(key).ok();

    let resolver: Box<dyn SecretResolver> = match env::var("SECRETS_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            tracing::info!(secrets_dir = %dir, "Reading secrets from files");
            Box::new(FilesystemSecretResolver::new(dir))
        }
        _ => Box::new(EnvironmentSecretResolver::new()),
    };

    let relay_config = RelayConfig::load(lookup, resolver.as_ref()).await?;
    relay_config.log_summary();
    let api_config = config::load_api_config(lookup)?;

    let registry = prometheus::Registry::new();
    let metrics = Arc::new(PrometheusDeliveryMetrics::new(&registry)?);

    let mut state = AppState::new(relay_config.clone()).with_metrics(metrics, registry);
    if let Some(token) = relay_config.bot_token.clone() {
        let dispatcher = TelegramDispatcher::new(&relay_config.telegram_api_base_url, token)?;
        state = state.with_dispatcher(Arc::new(dispatcher));
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting DeployRelay server"
    );

    ApiServer::new(api_config, state).serve().await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
