//! Database pool and migrations
//!
//! Domain functions use sqlx's generic Executor trait, so they accept both
//! `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! if !movies::movie_exists(&mut *tx, movie_id).await? { ... }
//! ratings::upsert_rating(&mut *tx, ip, movie_id, star).await?;
//! tx.commit().await?;
//! ```
//!
//! `PgStore` owns transaction boundaries; routes never touch the pool.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::store::StoreError;

/// Connect the pool and apply embedded migrations when enabled
pub async fn connect(config: &AppConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    Ok(pool)
}
