pub mod actors;
pub mod dto;
pub mod movies;
pub mod ratings;
pub mod reviews;

use axum::{Router, extract::State, routing::get};
use std::sync::Arc;

use crate::AppState;
use crate::config::AppConfig;
use crate::services::error::{ApiError, LogErr};
use crate::services::rate_limit;

/// Build all routes for the API
pub fn build_routes(config: &AppConfig) -> Router<Arc<AppState>> {
    let writes = rate_limit::limit_writes(
        Router::new().merge(reviews::routes()).merge(ratings::routes()),
        config,
    );

    let api = Router::new()
        .merge(movies::routes())
        .merge(actors::routes())
        .merge(writes);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

/// GET /health - Liveness plus a store round trip
async fn health(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state
        .store
        .ping()
        .await
        .log_500(&format!("Health check error ({})", state.store.backend_tag()))?;
    Ok("ok")
}
