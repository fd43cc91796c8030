mod cache;
mod categorize;
mod config;
mod error;
mod http;
mod loader;
mod model;
mod normalize;
mod search;
mod server;
mod state;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::PickerCache;
use config::Config;
use faq_common::error::CommonError;
use faq_common::source_client::{SourceClient, SourceClientConfig};
use loader::CatalogLoader;
use search::SearchEngine;
use server::FaqPickerServer;
use state::PickerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting faq-picker");

    let config = Config::from_env()?;
    info!(
        backend_url = %config.backend_url,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        redis = config.redis_url.is_some(),
        http = config.http_addr.is_some(),
        "configuration loaded"
    );

    let redis_cache = faq_common::redis::RedisCache::new(config.redis_url.as_deref());
    if redis_cache.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without cache");
    }
    let cache = Arc::new(PickerCache::new(redis_cache));

    let client = SourceClient::new(SourceClientConfig::new(
        &config.backend_url,
        config.fetch_timeout,
    ))
    .map_err(CommonError::from)
    .map_err(error::AppError::from)?;
    let loader = Arc::new(CatalogLoader::new(client, Arc::clone(&cache)));

    let outcome = loader.refresh().await;
    info!(
        fingerprint = %outcome.catalog.fingerprint,
        questions = outcome.catalog.question_count(),
        failed_sources = ?outcome.failed_sources(),
        "initial catalog ready"
    );

    let state = PickerState::new(
        outcome.catalog,
        Arc::new(SearchEngine::new(Arc::clone(&cache))),
        loader,
    );

    if let Some(addr) = config.http_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        let http_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = http::serve(listener, http_state).await {
                tracing::error!(error = %e, "HTTP server error");
            }
        });
    }

    let server = FaqPickerServer::new(state);

    if let Some(addr) = config.mcp_tcp_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
