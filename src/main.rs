mod api;
mod config;
mod models;
mod storage;
mod tracker;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use config::{Config, StoreBackend};
use storage::{MemoryStore, PostgresStore, VisitorStore};
use tracker::VisitTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize visitor store
    let store: Arc<dyn VisitorStore> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory visitor store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            info!("Using PostgreSQL visitor store");
            Arc::new(PostgresStore::new(
                &config.store.database_url,
                config.store.max_connections,
            )?)
        }
    };

    // An unreachable database must not take the process down: keep serving
    // and let store calls fail per request until it recovers.
    if let Err(e) = store.init().await {
        warn!(error = %e, "Visitor store initialization failed, continuing in degraded mode");
    } else {
        info!("Visitor store initialized successfully");
    }

    let tracker = Arc::new(VisitTracker::new(store));
    let app = api::create_router(Arc::clone(&tracker), config.visitors_format);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
