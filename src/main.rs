use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ott_catalog_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, DocumentStore, MemoryStore, PgDocumentStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ott_catalog_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let state = match connect_store(&config).await {
        Some(store) => {
            tracing::info!(backend = store.backend(), "Document store ready");
            AppState::new(store)
        }
        None => {
            tracing::warn!("No document store available, serving in degraded mode");
            AppState::unconfigured()
        }
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the store from configuration. Connection or migration failures are
/// logged and leave the service without a store.
async fn connect_store(config: &Config) -> Option<Arc<dyn DocumentStore>> {
    if let Some(url) = &config.database_url {
        let pool = match create_pool(url, config.database_max_connections).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database");
                return None;
            }
        };

        let store = PgDocumentStore::new(pool);
        if let Err(e) = store.migrate().await {
            tracing::error!(error = %e, "Failed to apply migrations");
            return None;
        }
        return Some(Arc::new(store));
    }

    if config.use_memory_store {
        return Some(Arc::new(MemoryStore::new()));
    }

    None
}
