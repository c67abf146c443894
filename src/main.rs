use std::net::SocketAddr;

use weather_mcp_gateway::infra::{self, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    infra::logging::init();

    let cfg = Config::from_env();
    if cfg.uses_default_token() {
        tracing::warn!("MCP_BEARER_TOKEN is not set; falling back to the insecure default token");
    }
    tracing::info!(port = cfg.port, "BOOT weather-mcp-gateway");

    let app = infra::http_app::build_app_from_env(&cfg);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
