//! Actor endpoints (/api/actors*)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use std::sync::Arc;

use super::dto::{ActorListItem, ActorResponse};
use crate::AppState;
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actors/", get(list_actors))
        .route("/actors/{id}", get(get_actor))
}

/// GET /api/actors/ - All actors and directors
async fn list_actors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActorListItem>>, ApiError> {
    let actors = state.store.list_actors().await?;
    Ok(Json(actors.iter().map(ActorListItem::from).collect()))
}

/// GET /api/actors/:id - Full actor record
async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<i64>,
) -> Result<Json<ActorResponse>, ApiError> {
    let actor = state
        .store
        .get_actor(actor_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(ActorResponse::from(actor)))
}
