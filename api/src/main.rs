use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use movies_api::config::{AppConfig, LogFormat, StoreBackend};
use movies_api::services::db;
use movies_api::store::{CatalogStore, MemoryStore, PgStore};
use movies_api::{AppState, build_app};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::connect(config)
                .await
                .context("Failed to connect to database")?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            if config.seed_demo_data {
                store.seed_demo().await;
            }
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    let store = open_store(&config).await?;
    tracing::info!(backend = store.backend_tag(), "store ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server failed")?;

    Ok(())
}
