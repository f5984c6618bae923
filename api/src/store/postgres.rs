use async_trait::async_trait;
use sqlx::PgPool;

use super::{CatalogStore, StoreError, Window};
use crate::constants::MAX_REVIEW_DEPTH;
use crate::domain::actors::{self, Actor, Credit};
use crate::domain::movies::{self, MovieDetail, MovieFilter, MovieSummary};
use crate::domain::ratings::{self, Rating};
use crate::domain::reviews::{self, NewReview, Review};

/// Postgres-backed catalog
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_movies(
        &self,
        filter: &MovieFilter,
        client_ip: &str,
        window: Window,
    ) -> Result<(Vec<MovieSummary>, i64), StoreError> {
        // Count and page from one snapshot so `count` agrees with `result`
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let total = movies::count_movies(&mut *tx, filter).await?;
        let items = movies::list_movies_paginated(
            &mut *tx,
            filter,
            client_ip,
            window.limit,
            window.offset,
        )
        .await?;

        tx.commit().await?;
        Ok((items, total))
    }

    async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieDetail>, StoreError> {
        let Some(movie) = movies::get_movie(&self.db, movie_id).await? else {
            return Ok(None);
        };

        let directors = actors::list_movie_credits(&self.db, movie_id, Credit::Directors).await?;
        let cast = actors::list_movie_credits(&self.db, movie_id, Credit::Cast).await?;
        let genres = movies::list_movie_genres(&self.db, movie_id).await?;
        let reviews = reviews::list_movie_reviews(&self.db, movie_id).await?;

        Ok(Some(MovieDetail {
            movie,
            directors,
            actors: cast,
            genres,
            reviews,
        }))
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        Ok(actors::list_actors(&self.db).await?)
    }

    async fn get_actor(&self, actor_id: i64) -> Result<Option<Actor>, StoreError> {
        Ok(actors::get_actor(&self.db, actor_id).await?)
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut tx = self.db.begin().await?;

        if !movies::movie_exists(&mut *tx, review.movie_id).await? {
            return Err(StoreError::MovieNotFound(review.movie_id));
        }

        if let Some(parent_id) = review.parent_id {
            let parent = reviews::get_review(&mut *tx, parent_id)
                .await?
                .ok_or(StoreError::ParentNotFound(parent_id))?;
            if parent.movie_id != review.movie_id {
                return Err(StoreError::ParentMovieMismatch {
                    parent: parent_id,
                    parent_movie: parent.movie_id,
                    movie: review.movie_id,
                });
            }

            let depth = reviews::review_depth(&mut *tx, parent_id).await?;
            if depth >= MAX_REVIEW_DEPTH {
                return Err(StoreError::ReplyTooDeep {
                    parent: parent_id,
                    depth,
                });
            }
        }

        let created = reviews::insert_review(&mut *tx, &review).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn upsert_rating(&self, ip: &str, movie_id: i64, star: i32) -> Result<Rating, StoreError> {
        let mut tx = self.db.begin().await?;

        if !movies::movie_exists(&mut *tx, movie_id).await? {
            return Err(StoreError::MovieNotFound(movie_id));
        }

        let rating = ratings::upsert_rating(&mut *tx, ip, movie_id, star).await?;
        tx.commit().await?;

        Ok(rating)
    }
}
