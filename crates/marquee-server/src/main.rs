//! Marquee Catalog Server binary.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use marquee_server::cache::CacheCoordinator;
use marquee_server::catalog::{CatalogService, load_seed};
use marquee_server::metrics::{CacheMetrics, init_metrics};
use marquee_server::{AppState, MokaStore, ServerConfig, run_server_with_state};
use marquee_store::{MemoryStore, RecordStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: defaults, optional marquee.toml, MARQUEE__* env
    let config = ServerConfig::load()?;
    let addr = config.bind_addr()?;

    tracing::info!(
        "Starting Marquee Catalog Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Metrics recorder must be installed before any counter is touched
    let prometheus_handle = init_metrics()?;
    let cache_metrics = CacheMetrics::new();

    // Build the record store, seeded from file if configured
    let store: Arc<dyn RecordStore> = match &config.catalog.seed_path {
        Some(path) => {
            let records = load_seed(path)?;
            tracing::info!(
                path = %path.display(),
                count = records.len(),
                "Catalog seeded from file"
            );
            Arc::new(MemoryStore::with_records(records))
        },
        None => Arc::new(MemoryStore::new()),
    };

    // Cache backend and coordinator
    let cache = Arc::new(MokaStore::new(config.moka_config(), cache_metrics.clone()));
    let coordinator = Arc::new(CacheCoordinator::new(
        Arc::clone(&store),
        cache,
        config.coordinator_config(),
        cache_metrics,
    ));

    let catalog = Arc::new(CatalogService::new(
        store,
        Arc::clone(&coordinator),
        config.query_limits(),
    ));

    let state = AppState::new(catalog, coordinator);

    // Run server
    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}
