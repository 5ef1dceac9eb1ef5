use axum::http::HeaderName;
use tracing_subscriber::EnvFilter;

use media_catalog::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db::{self, MemoryStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let identity_header = HeaderName::try_from(config.identity_header.as_str())?;

    let state = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL and applied migrations");
            AppState::postgres(pool, config.tenancy)
        }
        StorageBackend::Memory => {
            let store = MemoryStore::with_default_genres().await;
            for username in &config.memory_users {
                store.register_user(username).await;
            }
            tracing::warn!(
                users = config.memory_users.len(),
                "Using in-memory storage; data is lost on shutdown"
            );
            AppState::in_memory(store, config.tenancy)
        }
    }
    .with_identity_header(identity_header);

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        tenancy = ?config.tenancy,
        storage = ?config.storage,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
