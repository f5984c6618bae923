//! Movie catalog HTTP API

pub mod config;
pub mod constants;
pub mod domain;
pub mod routes;
pub mod services;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::AppConfig;
use store::CatalogStore;

pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, config: AppConfig) -> Arc<Self> {
        Arc::new(Self { store, config })
    }
}

/// Full application router with request tracing and CORS applied
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::build_routes(&state.config)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
