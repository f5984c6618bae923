//! Error handling utilities for route handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::constants::MAX_REVIEW_DEPTH;
use crate::store::StoreError;

/// Field name to the list of problems found with it
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

pub const FIELD_REQUIRED: &str = "This field is required.";

/// Record one more problem with `field`
pub fn push_field_error(errors: &mut FieldErrors, field: &'static str, message: impl Into<String>) {
    errors.entry(field).or_default().push(message.into());
}

/// JSON body extractor whose rejections render as [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// Validation error on a single field
    pub fn field(name: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name, vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::BadRequest(detail) | ApiError::NotFound(detail) => json!({ "detail": detail }),
            ApiError::Internal => json!({ "detail": "Internal server error." }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MovieNotFound(id) => ApiError::field(
                "movie",
                format!("Invalid pk \"{id}\" - object does not exist."),
            ),
            StoreError::ParentNotFound(id) => ApiError::field(
                "parent",
                format!("Invalid pk \"{id}\" - object does not exist."),
            ),
            StoreError::ParentMovieMismatch { parent, .. } => ApiError::field(
                "parent",
                format!("Review {parent} belongs to a different movie."),
            ),
            StoreError::ReplyTooDeep { parent, .. } => ApiError::field(
                "parent",
                format!(
                    "Review {parent} is already nested {MAX_REVIEW_DEPTH} levels deep; replies cannot go deeper."
                ),
            ),
            StoreError::Database(_) | StoreError::Migrate(_) => {
                tracing::error!(error = %err, "store failure");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return ApiError::Internal
    fn log_500(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            ApiError::Internal
        })
    }
}
