//! docscan REST API server

use anyhow::{Context, Result};
use clap::Parser;
use core_pipeline::ResultStore;
use docscan_server::{build_router, AppState, ServerConfig};
use llm_bridge::{Extractor, VisionModel};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();

    tracing::info!("Loading model {}...", config.model);
    let model = VisionModel::connect(config.ollama_config())
        .await
        .with_context(|| format!("Failed to load vision model '{}'", config.model))?;

    let store = Arc::new(ResultStore::new(config.result_capacity));
    let extractor =
        Extractor::new(Arc::new(model), store).release_after_call(config.release_after_call);

    let app = build_router(AppState {
        extractor: Arc::new(extractor),
        static_dir: config.static_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("Server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
