use anyhow::Context;

use grounded_chat::{build_app, init_tracing, run_server, AppConfig, AppState, AzureSearchGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    tracing::info!(
        deployment = %config.gateway.deployment,
        index = %config.gateway.search_index,
        "completion gateway configured"
    );

    let app = build_app(AppState::new(AzureSearchGateway::new(config.gateway)));

    run_server(app, config.port).await.context("server failed")
}
