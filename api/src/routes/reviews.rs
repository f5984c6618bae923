//! Review submission (/api/review/)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;

use super::dto::ReviewResponse;
use crate::AppState;
use crate::constants::{REVIEW_EMAIL_MAX_LEN, REVIEW_NAME_MAX_LEN, REVIEW_TEXT_MAX_LEN};
use crate::domain::reviews::NewReview;
use crate::services::error::{ApiError, ApiJson, FIELD_REQUIRED, FieldErrors, push_field_error};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/review/", post(create_review))
}

/// Required fields are optional here so a missing one becomes a field error
#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewRequest {
    pub movie: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub parent: Option<i64>,
}

impl CreateReviewRequest {
    /// Trimmed, length-checked review ready for the store
    pub fn validate(self) -> Result<NewReview, ApiError> {
        let mut errors = FieldErrors::new();

        if self.movie.is_none() {
            push_field_error(&mut errors, "movie", FIELD_REQUIRED);
        }
        let email = check_text(&mut errors, "email", self.email, REVIEW_EMAIL_MAX_LEN);
        if !email.is_empty() && !looks_like_email(&email) {
            push_field_error(&mut errors, "email", "Enter a valid email address.");
        }
        let name = check_text(&mut errors, "name", self.name, REVIEW_NAME_MAX_LEN);
        let text = check_text(&mut errors, "text", self.text, REVIEW_TEXT_MAX_LEN);

        match self.movie {
            Some(movie_id) if errors.is_empty() => Ok(NewReview {
                movie_id,
                email,
                name,
                text,
                parent_id: self.parent,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// Trimmed value of a required text field; problems go into `errors`
fn check_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<String>,
    max_len: usize,
) -> String {
    let Some(value) = value else {
        push_field_error(errors, field, FIELD_REQUIRED);
        return String::new();
    };

    let value = value.trim().to_string();
    if value.is_empty() {
        push_field_error(errors, field, "This field may not be blank.");
    } else if value.chars().count() > max_len {
        push_field_error(
            errors,
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
    value
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// POST /api/review/ - Add a review, optionally as a reply to another
async fn create_review(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let review = req.validate()?;
    let created = state.store.create_review(review).await?;

    tracing::info!(
        review_id = created.id,
        movie_id = created.movie_id,
        parent_id = ?created.parent_id,
        "review created"
    );

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(created))))
}
