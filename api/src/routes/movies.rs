//! Movie endpoints (/api/movie/*)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use super::dto::{MovieDetailResponse, MovieListItem};
use crate::AppState;
use crate::domain::movies::MovieFilter;
use crate::services::client_ip::ClientIp;
use crate::services::error::ApiError;
use crate::services::pagination::{Page, PageLinkBase, PageRequest};
use crate::store::Window;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie/", get(list_movies))
        .route("/movie/{id}/", get(get_movie))
}

/// Raw list parameters; parsed by hand so bad values get field-level errors
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub genres: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl MovieListQuery {
    pub fn filter(&self) -> Result<MovieFilter, ApiError> {
        Ok(MovieFilter {
            genres: MovieFilter::parse_genres(self.genres.as_deref()),
            year_min: parse_year("year_min", self.year_min.as_deref())?,
            year_max: parse_year("year_max", self.year_max.as_deref())?,
        })
    }
}

fn parse_year(name: &'static str, raw: Option<&str>) -> Result<Option<i32>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApiError::field(name, "Enter a whole number.")),
    }
}

/// GET /api/movie/ - Published movies, filtered and paginated
async fn list_movies(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    links: PageLinkBase,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<Page<MovieListItem>>, ApiError> {
    let filter = query.filter()?;
    let mut page = PageRequest::parse(query.page.as_deref(), query.page_size.as_deref())?;

    if page.last {
        let (_, total) = state
            .store
            .list_movies(&filter, &client_ip, Window { limit: 0, offset: 0 })
            .await?;
        page = page.at_last_page(total);
    }

    let (movies, total) = state
        .store
        .list_movies(&filter, &client_ip, page.window())
        .await?;

    tracing::debug!(
        count = total,
        page = page.page,
        genres = ?filter.genres,
        "listed movies"
    );

    let items = movies.into_iter().map(MovieListItem::from).collect();
    Ok(Json(page.into_page(total, items, &links)?))
}

/// GET /api/movie/:id/ - A published movie with credits and review tree
async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieDetailResponse>, ApiError> {
    let movie = state
        .store
        .get_movie(movie_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(MovieDetailResponse::from(movie)))
}
