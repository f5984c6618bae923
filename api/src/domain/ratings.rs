//! Rating domain - one star rating per (client IP, movie)
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use sqlx::{Executor, Postgres};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub movie_id: i64,
    pub ip: String,
    pub star: i32,
}

/// Arithmetic mean of star values, `None` for an empty set
pub fn mean_star(stars: &[i32]) -> Option<f64> {
    if stars.is_empty() {
        return None;
    }
    let sum: i64 = stars.iter().map(|&s| i64::from(s)).sum();
    Some(sum as f64 / stars.len() as f64)
}

/// Create the rating for (ip, movie) or overwrite its star.
/// The unique (ip, movie_id) constraint makes this a single atomic statement.
pub async fn upsert_rating<'e, E>(
    executor: E,
    ip: &str,
    movie_id: i64,
    star: i32,
) -> Result<Rating, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO ratings (ip, movie_id, star)
        VALUES ($1, $2, $3)
        ON CONFLICT (ip, movie_id)
        DO UPDATE SET star = EXCLUDED.star
        RETURNING id, movie_id, ip, star
        "#,
    )
    .bind(ip)
    .bind(movie_id)
    .bind(star)
    .fetch_one(executor)
    .await
}
