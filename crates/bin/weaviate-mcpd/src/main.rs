//! Daemon entry point for the Weaviate MCP server.
//!
//! Loads configuration from the environment, builds the Weaviate bridge, and
//! serves the MCP protocol over stdio or streamable HTTP.

mod config;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use weaviate_core::bridge::WeaviateBridge;
use weaviate_core::dispatch::DispatchContext;
use weaviate_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};

use crate::config::{DaemonConfig, Transport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = DaemonConfig::from_args()?;
    init_tracing(&config.log_level);

    let connection = &config.connection;
    let bridge = WeaviateBridge::connect(connection)?;
    info!(
        host = connection.host(),
        scheme = %connection.scheme(),
        authenticated = connection.credential().is_some(),
        default_collection = %config.default_collection,
        "weaviate bridge configured"
    );

    if config.wait_ready {
        bridge
            .store()
            .wait_until_ready(connection.startup_timeout())
            .await?;
        info!("weaviate is ready");
    }

    let context = Arc::new(DispatchContext::new(bridge, config.default_collection)?);
    match config.transport {
        Transport::Stdio => serve_stdio(context).await,
        Transport::Http(addr) => {
            serve_streamable_http(context, McpHttpServerConfig::new(addr)).await
        }
    }
}

// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
