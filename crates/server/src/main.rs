//! offcache server entry point.
//!
//! Boots the offline cache, runs install and activate, starts the periodic
//! cleanup and then serves MCP on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offcache_client::{FetchClient, FetchConfig, Lifecycle};
use offcache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
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
        db = %config.db_path.display(),
        version = %config.version,
        "Starting offcache server on stdio transport"
    );

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let lifecycle = Arc::new(Lifecycle::new(&config, store, network)?);

    // A failed install leaves the previous version's partitions serving.
    match lifecycle.on_install().await {
        Ok(_) => {
            if let Err(e) = lifecycle.on_activate().await {
                tracing::error!(error = %e, "startup activation failed");
            }
        }
        Err(e) => tracing::error!(error = %e, "startup install failed"),
    }

    let cleanup = lifecycle.cleanup_task().spawn();

    let handler = handler::OfflineCacheServer::new(Arc::clone(&lifecycle));
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    cleanup.abort();
    lifecycle.engine().settle().await;

    Ok(())
}
