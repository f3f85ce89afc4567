//! lobby-gateway server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket endpoint and the
//! read-only REST lobby browser.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lobby_gateway::app_state::AppState;
use lobby_gateway::config::GatewayConfig;
use lobby_gateway::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    tracing::info!(
        addr = %config.listen_addr,
        default_capacity = config.default_lobby_capacity,
        max_capacity = config.max_lobby_capacity,
        min_ready = config.min_ready_members,
        outbound_buffer = config.outbound_buffer,
        "starting lobby-gateway"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    let state = AppState::new(config);

    server::serve(listener, state).await?;
    Ok(())
}
