//! Movie domain - catalog queries with per-client rating annotations
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).
//! Draft movies are never returned by anything in this module.

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};

use super::actors::ActorSummary;
use super::reviews::Review;

/// A row of the public movie list, annotated for the requesting client
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub category: Option<String>,
    /// Whether the requesting IP has already rated this movie
    pub rating_user: bool,
    /// Mean star value, `None` while the movie has no ratings
    pub middle_rating: Option<f64>,
}

/// The scalar columns of a published movie
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i32,
    pub country: String,
    pub world_premiere: NaiveDate,
    pub budget: i64,
    pub fees_in_usa: i64,
    pub fees_in_world: i64,
    pub category: Option<String>,
    pub url: String,
}

/// Movie with its relations, reviews still flat
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: MovieRecord,
    pub directors: Vec<ActorSummary>,
    pub actors: Vec<ActorSummary>,
    pub genres: Vec<String>,
    pub reviews: Vec<Review>,
}

/// Narrowing applied to the movie list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Genre names; a movie matches when it has any of them
    pub genres: Vec<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl MovieFilter {
    /// Parse the comma separated `genres` parameter, dropping blank entries
    pub fn parse_genres(raw: Option<&str>) -> Vec<String> {
        raw.map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }

    /// In-process equivalent of the SQL predicate
    pub fn matches<'a>(&self, year: i32, genre_names: impl IntoIterator<Item = &'a str>) -> bool {
        if self.year_min.is_some_and(|min| year < min) {
            return false;
        }
        if self.year_max.is_some_and(|max| year > max) {
            return false;
        }
        if self.genres.is_empty() {
            return true;
        }
        genre_names
            .into_iter()
            .any(|name| self.genres.iter().any(|g| g == name))
    }

    /// Appends the filter as `AND ...` clauses; the builder must already hold a WHERE
    fn push_predicates(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(min) = self.year_min {
            builder.push(" AND m.year >= ");
            builder.push_bind(min);
        }
        if let Some(max) = self.year_max {
            builder.push(" AND m.year <= ");
            builder.push_bind(max);
        }
        if !self.genres.is_empty() {
            // EXISTS keeps one row per movie however many genres match
            builder.push(
                " AND EXISTS (SELECT 1 FROM movie_genres mg \
                 JOIN genres g ON g.id = mg.genre_id \
                 WHERE mg.movie_id = m.id AND g.name = ANY(",
            );
            builder.push_bind(self.genres.clone());
            builder.push("))");
        }
    }
}

/// Count published movies matching the filter
pub async fn count_movies<'e, E>(executor: E, filter: &MovieFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies m WHERE m.draft = FALSE");
    filter.push_predicates(&mut builder);

    let (count,): (i64,) = builder.build_query_as().fetch_one(executor).await?;
    Ok(count)
}

/// List published movies with pagination, annotated for `client_ip`
pub async fn list_movies_paginated<'e, E>(
    executor: E,
    filter: &MovieFilter,
    client_ip: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<MovieSummary>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut builder = QueryBuilder::<Postgres>::new(
        r#"
        SELECT m.id, m.title, m.tagline, c.name AS category,
               EXISTS (
                   SELECT 1 FROM ratings r WHERE r.movie_id = m.id AND r.ip = "#,
    );
    builder.push_bind(client_ip.to_string());
    builder.push(
        r#"
               ) AS rating_user,
               (SELECT AVG(r.star)::float8 FROM ratings r WHERE r.movie_id = m.id) AS middle_rating
        FROM movies m
        LEFT JOIN categories c ON c.id = m.category_id
        WHERE m.draft = FALSE"#,
    );
    filter.push_predicates(&mut builder);
    builder.push(" ORDER BY m.id ASC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let movies = builder.build_query_as().fetch_all(executor).await?;
    Ok(movies)
}

/// Get a published movie's scalar columns
pub async fn get_movie<'e, E>(executor: E, movie_id: i64) -> Result<Option<MovieRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT m.id, m.title, m.tagline, m.description, m.poster, m.year, m.country,
               m.world_premiere, m.budget, m.fees_in_usa, m.fees_in_world,
               c.name AS category, m.url
        FROM movies m
        LEFT JOIN categories c ON c.id = m.category_id
        WHERE m.id = $1 AND m.draft = FALSE
        "#,
    )
    .bind(movie_id)
    .fetch_optional(executor)
    .await
}

/// Genre names of a movie, ordered by genre id
pub async fn list_movie_genres<'e, E>(executor: E, movie_id: i64) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT g.name
        FROM movie_genres mg
        JOIN genres g ON g.id = mg.genre_id
        WHERE mg.movie_id = $1
        ORDER BY g.id ASC
        "#,
    )
    .bind(movie_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Whether a movie with this id exists at all (drafts included)
pub async fn movie_exists<'e, E>(executor: E, movie_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
        .bind(movie_id)
        .fetch_one(executor)
        .await?;
    Ok(exists)
}
