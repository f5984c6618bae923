//! Star ratings (/api/rating/)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;

use super::dto::RatingResponse;
use crate::AppState;
use crate::constants::{MAX_STAR, MIN_STAR};
use crate::services::client_ip::ClientIp;
use crate::services::error::{ApiError, ApiJson, FIELD_REQUIRED, FieldErrors, push_field_error};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/rating/", post(create_rating))
}

/// Both fields are optional here so a missing one becomes a field error
#[derive(Debug, Default, Deserialize)]
pub struct CreateRatingRequest {
    pub star: Option<i32>,
    pub movie: Option<i64>,
}

impl CreateRatingRequest {
    /// `(movie, star)` once both are present and the star is in range
    pub fn validate(self) -> Result<(i64, i32), ApiError> {
        let mut errors = FieldErrors::new();

        match self.star {
            None => push_field_error(&mut errors, "star", FIELD_REQUIRED),
            Some(star) if !(MIN_STAR..=MAX_STAR).contains(&star) => push_field_error(
                &mut errors,
                "star",
                format!("Ensure this value is between {MIN_STAR} and {MAX_STAR}."),
            ),
            Some(_) => {}
        }
        if self.movie.is_none() {
            push_field_error(&mut errors, "movie", FIELD_REQUIRED);
        }

        match (self.movie, self.star) {
            (Some(movie), Some(star)) if errors.is_empty() => Ok((movie, star)),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// POST /api/rating/ - Rate a movie; a repeat from the same address replaces the old star
async fn create_rating(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    ApiJson(req): ApiJson<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    let (movie_id, star) = req.validate()?;
    let rating = state
        .store
        .upsert_rating(&client_ip, movie_id, star)
        .await?;

    tracing::info!(
        rating_id = rating.id,
        movie_id = rating.movie_id,
        star = rating.star,
        "rating stored"
    );

    Ok((StatusCode::CREATED, Json(RatingResponse::from(rating))))
}
