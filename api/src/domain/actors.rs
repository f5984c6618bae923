//! Actor domain - models and DB queries for actors and directors
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Executor, Postgres, Type};

/// What a person does on set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    #[default]
    Actor,
    Director,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Actor => "actor",
            ActorRole::Director => "director",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "director" => ActorRole::Director,
            _ => ActorRole::Actor,
        }
    }
}

// Stored as VARCHAR, decoded leniently like the other text-backed enums
impl Type<Postgres> for ActorRole {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for ActorRole {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        Ok(ActorRole::from_str(&s))
    }
}

impl Encode<'_, Postgres> for ActorRole {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.as_str().to_owned(), buf)
    }
}

/// Full actor record
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub role: ActorRole,
    pub description: String,
    pub image: String,
}

/// The slice of an actor shown in lists and movie credits
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ActorSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
}

impl From<&Actor> for ActorSummary {
    fn from(a: &Actor) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            image: a.image.clone(),
        }
    }
}

/// Which credit list of a movie to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credit {
    Directors,
    Cast,
}

impl Credit {
    fn join_table(&self) -> &'static str {
        match self {
            Credit::Directors => "movie_directors",
            Credit::Cast => "movie_actors",
        }
    }
}

/// List all actors ordered by id
pub async fn list_actors<'e, E>(executor: E) -> Result<Vec<Actor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, name, age, role, description, image
        FROM actors
        ORDER BY id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Get a single actor by ID
pub async fn get_actor<'e, E>(executor: E, actor_id: i64) -> Result<Option<Actor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, name, age, role, description, image
        FROM actors
        WHERE id = $1
        "#,
    )
    .bind(actor_id)
    .fetch_optional(executor)
    .await
}

/// Directors or cast of a movie, ordered by actor id
pub async fn list_movie_credits<'e, E>(
    executor: E,
    movie_id: i64,
    credit: Credit,
) -> Result<Vec<ActorSummary>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        SELECT a.id, a.name, a.image
        FROM {} c
        JOIN actors a ON a.id = c.actor_id
        WHERE c.movie_id = $1
        ORDER BY a.id ASC
        "#,
        credit.join_table()
    );

    sqlx::query_as(&query)
        .bind(movie_id)
        .fetch_all(executor)
        .await
}
