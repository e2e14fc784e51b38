use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;
use sentiment_api::{build_router, init_logger, shutdown_signal, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let config = ServerConfig::parse();

    info!("=== Starting Sentiment API ===");

    // Artifacts load before the listener binds; any failure ends the process
    let start_time = Instant::now();
    let loader = config.artifact_loader();
    info!("Vectorizer artifact: {:?}", loader.vectorizer_path());
    info!("Classifier artifact: {:?}", loader.classifier_path());
    let model = loader
        .load()
        .context("Model or vectorizer artifacts could not be loaded")?;
    info!("Artifacts loaded in {:.2?}: {:?}", start_time.elapsed(), model.info());

    let app = build_router(Arc::new(AppState::new(model)));

    let listen_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Sentiment API listening on http://{}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("=== Sentiment API stopped ===");
    Ok(())
}
