//! Transport runners: stdio for local MCP clients, streamable HTTP for remote ones.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use serde::Serialize;
use tracing::info;
use weaviate_core::bridge::Bridge;
use weaviate_core::catalog::TOOL_CATALOG;
use weaviate_core::dispatch::DispatchContext;

use crate::WeaviateMcp;

pub const DEFAULT_MCP_HTTP_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4020);

pub const MCP_PATH: &str = "/mcp";
pub const HEALTH_PATH: &str = "/health";

type ServeResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Listener and session settings for the streamable HTTP transport.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }

    fn session_config(&self) -> StreamableHttpServerConfig {
        StreamableHttpServerConfig {
            sse_keep_alive: self.sse_keep_alive,
            sse_retry: self.sse_retry,
            stateful_mode: self.stateful_mode,
            ..Default::default()
        }
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MCP_HTTP_ADDR)
    }
}

/// Body of the `/health` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    default_collection: String,
    tools: Vec<&'static str>,
}

async fn health<B: Bridge>(State(context): State<Arc<DispatchContext<B>>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        default_collection: context.default_collection().to_string(),
        tools: TOOL_CATALOG.iter().map(|tool| tool.name).collect(),
    })
}

/// Builds the HTTP application: MCP sessions under `/mcp`, liveness under `/health`.
///
/// Every session gets its own `WeaviateMcp` sharing `context`.
#[must_use]
pub fn router<B: Bridge>(
    context: Arc<DispatchContext<B>>,
    config: &McpHttpServerConfig,
) -> Router {
    let session_context = context.clone();
    let mcp: StreamableHttpService<WeaviateMcp<B>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(WeaviateMcp::with_context(session_context.clone())),
            Arc::new(LocalSessionManager::default()),
            config.session_config(),
        );

    Router::new()
        .route(HEALTH_PATH, get(health::<B>))
        .with_state(context)
        .nest_service(MCP_PATH, mcp)
}

/// Serves MCP over the process's stdin and stdout until the client disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<B: Bridge>(context: Arc<DispatchContext<B>>) -> ServeResult {
    info!(
        default_collection = context.default_collection(),
        "weaviate-mcp serving over stdio"
    );
    let running = serve_server(WeaviateMcp::with_context(context), stdio()).await?;
    let reason = running.waiting().await?;
    info!(?reason, "stdio session ended");
    Ok(())
}

/// Binds `config.addr` and serves MCP over streamable HTTP.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<B: Bridge>(
    context: Arc<DispatchContext<B>>,
    config: McpHttpServerConfig,
) -> ServeResult {
    let app = router(context, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(
        addr = %listener.local_addr()?,
        path = MCP_PATH,
        stateful = config.stateful_mode,
        "weaviate-mcp listening for streamable HTTP"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
