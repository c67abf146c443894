use axum::{
    middleware,
    routing::{any_service, get},
    Router,
};
use rmcp::handler::server::tool::ToolRouter;
use std::sync::Arc;

use crate::infra::auth::{self, TokenVerifier};
use crate::infra::config::Config;
use crate::infra::runtime::mcp_transport::{self, LocalSessionManager, ServerHandler};
use crate::tools::weather;

/// App with `/healthz` plus the streamable MCP service at `/mcp`, the latter
/// gated by bearer verification so rejected calls never reach a tool handler.
pub fn build_app<H>(
    verifier: TokenVerifier,
    factory: impl Fn() -> (H, ToolRouter<H>) + Send + Sync + Clone + 'static,
) -> Router
where
    H: ServerHandler,
{
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = mcp_transport::make_streamable_http_service(factory, session_mgr);

    let mcp = Router::new()
        .route_service("/mcp", any_service(mcp_service))
        .layer(middleware::from_fn_with_state(
            verifier,
            auth::require_bearer,
        ));

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(mcp)
}

pub fn build_app_from_env(cfg: &Config) -> Router {
    build_app(
        TokenVerifier::new(cfg.bearer_token.clone()),
        weather::factory_from_env,
    )
}
