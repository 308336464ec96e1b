pub mod api;
pub mod chat;
pub mod config;
pub mod gateway;

use std::sync::Arc;

use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use chat::{respond, Outcome};
pub use config::{AppConfig, ConfigError, GatewayConfig, Secret};
pub use gateway::{AzureSearchGateway, CompletionGateway, GatewayError, GroundingOptions};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn CompletionGateway>,
}

impl AppState {
    pub fn new(gateway: impl CompletionGateway + 'static) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    api::router(state)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening");

    axum::serve(listener, app).await
}
