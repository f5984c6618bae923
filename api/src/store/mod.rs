//! Storage backends behind the HTTP layer
//!
//! Routes only see [`CatalogStore`]. `PgStore` runs the domain queries against
//! Postgres; `MemoryStore` keeps everything in process for local runs and tests.

mod memory;
mod postgres;

pub use memory::{MemoryStore, SeedActor, SeedMovie};
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::actors::Actor;
use crate::domain::movies::{MovieDetail, MovieFilter, MovieSummary};
use crate::domain::ratings::Rating;
use crate::domain::reviews::{NewReview, Review};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("movie {0} does not exist")]
    MovieNotFound(i64),

    #[error("review {0} does not exist")]
    ParentNotFound(i64),

    #[error("review {parent} belongs to movie {parent_movie}, not {movie}")]
    ParentMovieMismatch {
        parent: i64,
        parent_movie: i64,
        movie: i64,
    },

    #[error("review {parent} is already nested {depth} levels deep")]
    ReplyTooDeep { parent: i64, depth: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// A window into an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Cheap round trip proving the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Published movies matching `filter`, annotated for `client_ip`, plus the
    /// total number of matches ignoring the window.
    async fn list_movies(
        &self,
        filter: &MovieFilter,
        client_ip: &str,
        window: Window,
    ) -> Result<(Vec<MovieSummary>, i64), StoreError>;

    /// A published movie with its relations; drafts are reported as missing
    async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieDetail>, StoreError>;

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError>;

    async fn get_actor(&self, actor_id: i64) -> Result<Option<Actor>, StoreError>;

    /// Store a review. The movie must exist and a parent, when given, must
    /// be a review of the same movie sitting above `MAX_REVIEW_DEPTH`.
    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError>;

    /// Create or overwrite the rating keyed by (ip, movie)
    async fn upsert_rating(&self, ip: &str, movie_id: i64, star: i32) -> Result<Rating, StoreError>;
}
