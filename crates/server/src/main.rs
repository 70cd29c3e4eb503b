//! purgekit server entry point.
//!
//! Loads configuration, connects the invalidation engine to Redis, and serves
//! the purge tools over MCP on stdio. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use purgekit_core::{AppConfig, Purger, cache::TracingAudit};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        redis_hostname = %config.redis_hostname,
        redis_port = config.redis_port,
        "Starting purgekit server on stdio transport"
    );

    let purger = Purger::connect(&config.connection(), Arc::new(TracingAudit)).await;
    if !purger.is_connected() {
        tracing::warn!("Redis unavailable; purge requests will be no-ops until restart");
    }

    let handler = handler::PurgeServer::new(purger, config);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
