//! Review domain - threaded reviews and their DB queries
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{Executor, Postgres};

use crate::constants::MAX_REVIEW_DEPTH;

/// A stored review; `parent_id` links replies into a tree
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub movie_id: i64,
    pub email: String,
    pub name: String,
    pub text: String,
    pub parent_id: Option<i64>,
}

/// Review data accepted from a client
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub movie_id: i64,
    pub email: String,
    pub name: String,
    pub text: String,
    pub parent_id: Option<i64>,
}

/// A review with its replies nested beneath it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewNode {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub children: Vec<ReviewNode>,
}

/// Arrange a movie's flat review set into a forest.
///
/// Only reviews without a parent are roots. Every other review is reachable
/// solely through its parent, so a reply never shows up at the top level.
/// Reviews whose parent is missing from `reviews` are dropped, and because
/// the walk starts from roots a corrupted parent cycle can never be entered.
/// Roots and siblings are ordered by id. Nesting stops at
/// [`MAX_REVIEW_DEPTH`]; replies below that level are not rendered.
pub fn build_review_tree(mut reviews: Vec<Review>) -> Vec<ReviewNode> {
    reviews.sort_by_key(|r| r.id);

    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<Review>> = HashMap::new();
    for review in reviews {
        match review.parent_id {
            None => roots.push(review),
            Some(parent) => children.entry(parent).or_default().push(review),
        }
    }

    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children, 1))
        .collect()
}

fn attach_children(
    review: Review,
    children: &mut HashMap<i64, Vec<Review>>,
    depth: i64,
) -> ReviewNode {
    // remove() hands each child list out once, so every review is visited at most once
    let replies = if depth < MAX_REVIEW_DEPTH {
        children.remove(&review.id).unwrap_or_default()
    } else {
        Vec::new()
    };
    ReviewNode {
        id: review.id,
        name: review.name,
        text: review.text,
        children: replies
            .into_iter()
            .map(|child| attach_children(child, children, depth + 1))
            .collect(),
    }
}

/// All reviews of a movie, flat, ordered by id
pub async fn list_movie_reviews<'e, E>(executor: E, movie_id: i64) -> Result<Vec<Review>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, movie_id, email, name, text, parent_id
        FROM reviews
        WHERE movie_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(movie_id)
    .fetch_all(executor)
    .await
}

/// Get a single review by ID
pub async fn get_review<'e, E>(executor: E, review_id: i64) -> Result<Option<Review>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, movie_id, email, name, text, parent_id
        FROM reviews
        WHERE id = $1
        "#,
    )
    .bind(review_id)
    .fetch_optional(executor)
    .await
}

/// Length of the parent chain ending at `review_id`, the review itself
/// included; 0 when it does not exist. Counting stops past [`MAX_REVIEW_DEPTH`].
pub async fn review_depth<'e, E>(executor: E, review_id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (depth,): (i64,) = sqlx::query_as(
        r#"
        WITH RECURSIVE chain (id, parent_id, depth) AS (
            SELECT id, parent_id, 1 FROM reviews WHERE id = $1
            UNION ALL
            SELECT r.id, r.parent_id, c.depth + 1
            FROM reviews r
            JOIN chain c ON r.id = c.parent_id
            WHERE c.depth <= $2
        )
        SELECT COALESCE(MAX(depth), 0)::int8 FROM chain
        "#,
    )
    .bind(review_id)
    .bind(MAX_REVIEW_DEPTH as i32)
    .fetch_one(executor)
    .await?;

    Ok(depth)
}

/// Insert a review and return the stored row
pub async fn insert_review<'e, E>(executor: E, review: &NewReview) -> Result<Review, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO reviews (movie_id, email, name, text, parent_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, movie_id, email, name, text, parent_id
        "#,
    )
    .bind(review.movie_id)
    .bind(&review.email)
    .bind(&review.name)
    .bind(&review.text)
    .bind(review.parent_id)
    .fetch_one(executor)
    .await
}
