use std::sync::Arc;

use anyhow::Context;
use destination_unveiler::{
    config::Config,
    db::Dataset,
    init_tracing,
    routes::{create_router, AppState},
    services::{ProfileAggregator, Sources},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("destination_unveiler=info,tower_http=info");

    let config = Config::from_env()?;

    // Both inputs are required; the service cannot start without them
    let dataset =
        Dataset::from_path(&config.dataset_path).context("Failed to load reference dataset")?;
    let sources = Sources::from_config(&config).context("Failed to set up city data sources")?;

    let state = Arc::new(AppState {
        dataset: Arc::new(dataset),
        aggregator: ProfileAggregator::new(sources, &config.image_dir, config.source_timeout()),
    });

    // Create the router with all routes
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app).await?;
    Ok(())
}
