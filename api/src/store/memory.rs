use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{CatalogStore, StoreError, Window};
use crate::constants::MAX_REVIEW_DEPTH;
use crate::domain::actors::{Actor, ActorRole, ActorSummary};
use crate::domain::movies::{MovieDetail, MovieFilter, MovieRecord, MovieSummary};
use crate::domain::ratings::{self, Rating};
use crate::domain::reviews::{NewReview, Review};

/// Actor data for seeding the in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct SeedActor {
    pub name: String,
    pub age: i32,
    pub role: ActorRole,
    pub description: String,
    pub image: String,
}

/// Movie data for seeding the in-memory catalog.
/// Genres and category are stored by name; credits refer to actor ids.
#[derive(Debug, Clone, Default)]
pub struct SeedMovie {
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
    pub draft: bool,
    pub genres: Vec<String>,
    pub directors: Vec<i64>,
    pub actors: Vec<i64>,
}

struct StoredMovie {
    id: i64,
    seed: SeedMovie,
}

#[derive(Default)]
struct Tables {
    actor_seq: i64,
    movie_seq: i64,
    review_seq: i64,
    rating_seq: i64,
    actors: Vec<Actor>,
    movies: Vec<StoredMovie>,
    reviews: Vec<Review>,
    ratings: Vec<Rating>,
}

impl Tables {
    fn movie(&self, movie_id: i64) -> Option<&StoredMovie> {
        self.movies.iter().find(|m| m.id == movie_id)
    }

    /// Parent chain length ending at `review_id`, counted no further than one past the cap
    fn review_depth(&self, review_id: i64) -> i64 {
        let mut depth = 0;
        let mut next = Some(review_id);
        while let Some(id) = next {
            depth += 1;
            if depth > MAX_REVIEW_DEPTH {
                break;
            }
            next = self
                .reviews
                .iter()
                .find(|r| r.id == id)
                .and_then(|r| r.parent_id);
        }
        depth
    }

    fn credits(&self, ids: &[i64]) -> Vec<ActorSummary> {
        let mut credits: Vec<ActorSummary> = self
            .actors
            .iter()
            .filter(|a| ids.contains(&a.id))
            .map(ActorSummary::from)
            .collect();
        credits.sort_by_key(|a| a.id);
        credits
    }

    fn summarize(&self, movie: &StoredMovie, client_ip: &str) -> MovieSummary {
        let stars: Vec<i32> = self
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie.id)
            .map(|r| r.star)
            .collect();

        MovieSummary {
            id: movie.id,
            title: movie.seed.title.clone(),
            tagline: movie.seed.tagline.clone(),
            category: movie.seed.category.clone(),
            rating_user: self
                .ratings
                .iter()
                .any(|r| r.movie_id == movie.id && r.ip == client_ip),
            middle_rating: ratings::mean_star(&stars),
        }
    }
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

/// In-process catalog guarded by a single async mutex.
/// Every write happens under the lock, so the rating upsert is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_actor(&self, actor: SeedActor) -> i64 {
        let mut tables = self.tables.lock().await;
        let id = next_id(&mut tables.actor_seq);
        tables.actors.push(Actor {
            id,
            name: actor.name,
            age: actor.age,
            role: actor.role,
            description: actor.description,
            image: actor.image,
        });
        id
    }

    pub async fn add_movie(&self, movie: SeedMovie) -> i64 {
        let mut tables = self.tables.lock().await;
        let id = next_id(&mut tables.movie_seq);
        tables.movies.push(StoredMovie { id, seed: movie });
        id
    }

    /// Snapshot of every stored rating
    pub async fn ratings(&self) -> Vec<Rating> {
        self.tables.lock().await.ratings.clone()
    }

    /// Small catalog for running the API without a database
    pub async fn seed_demo(&self) {
        let scott = self
            .add_actor(SeedActor {
                name: "Ridley Scott".to_string(),
                age: 86,
                role: ActorRole::Director,
                description: "English film director and producer.".to_string(),
                image: "actors/ridley_scott.jpg".to_string(),
            })
            .await;
        let weaver = self
            .add_actor(SeedActor {
                name: "Sigourney Weaver".to_string(),
                age: 74,
                role: ActorRole::Actor,
                description: "American actress.".to_string(),
                image: "actors/sigourney_weaver.jpg".to_string(),
            })
            .await;
        let wachowski = self
            .add_actor(SeedActor {
                name: "Lana Wachowski".to_string(),
                age: 58,
                role: ActorRole::Director,
                description: "American film director.".to_string(),
                image: "actors/lana_wachowski.jpg".to_string(),
            })
            .await;
        let reeves = self
            .add_actor(SeedActor {
                name: "Keanu Reeves".to_string(),
                age: 59,
                role: ActorRole::Actor,
                description: "Canadian actor.".to_string(),
                image: "actors/keanu_reeves.jpg".to_string(),
            })
            .await;

        self.add_movie(SeedMovie {
            title: "Alien".to_string(),
            tagline: "In space no one can hear you scream.".to_string(),
            description: "The crew of a commercial spacecraft encounters a deadly lifeform.".to_string(),
            poster: "movies/alien.jpg".to_string(),
            year: 1979,
            country: "USA".to_string(),
            world_premiere: NaiveDate::from_ymd_opt(1979, 5, 25).unwrap_or_default(),
            budget: 11_000_000,
            fees_in_usa: 81_900_000,
            fees_in_world: 104_900_000,
            category: Some("Feature film".to_string()),
            url: "alien".to_string(),
            genres: vec!["Horror".to_string(), "Sci-Fi".to_string()],
            directors: vec![scott],
            actors: vec![weaver],
            ..Default::default()
        })
        .await;
        self.add_movie(SeedMovie {
            title: "The Matrix".to_string(),
            tagline: "Welcome to the Real World.".to_string(),
            description: "A hacker learns the true nature of his reality.".to_string(),
            poster: "movies/matrix.jpg".to_string(),
            year: 1999,
            country: "USA".to_string(),
            world_premiere: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap_or_default(),
            budget: 63_000_000,
            fees_in_usa: 171_400_000,
            fees_in_world: 467_200_000,
            category: Some("Feature film".to_string()),
            url: "the-matrix".to_string(),
            genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
            directors: vec![wachowski],
            actors: vec![reeves],
            ..Default::default()
        })
        .await;
        self.add_movie(SeedMovie {
            title: "Untitled Sequel".to_string(),
            year: 2026,
            url: "untitled-sequel".to_string(),
            draft: true,
            ..Default::default()
        })
        .await;
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_movies(
        &self,
        filter: &MovieFilter,
        client_ip: &str,
        window: Window,
    ) -> Result<(Vec<MovieSummary>, i64), StoreError> {
        let tables = self.tables.lock().await;

        let mut matching: Vec<&StoredMovie> = tables
            .movies
            .iter()
            .filter(|m| !m.seed.draft)
            .filter(|m| filter.matches(m.seed.year, m.seed.genres.iter().map(String::as_str)))
            .collect();
        matching.sort_by_key(|m| m.id);

        let total = matching.len() as i64;
        let offset = usize::try_from(window.offset).unwrap_or(0);
        let limit = usize::try_from(window.limit).unwrap_or(0);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|m| tables.summarize(m, client_ip))
            .collect();

        Ok((items, total))
    }

    async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieDetail>, StoreError> {
        let tables = self.tables.lock().await;

        let Some(stored) = tables.movie(movie_id).filter(|m| !m.seed.draft) else {
            return Ok(None);
        };
        let seed = &stored.seed;

        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.id);

        Ok(Some(MovieDetail {
            movie: MovieRecord {
                id: stored.id,
                title: seed.title.clone(),
                tagline: seed.tagline.clone(),
                description: seed.description.clone(),
                poster: seed.poster.clone(),
                year: seed.year,
                country: seed.country.clone(),
                world_premiere: seed.world_premiere,
                budget: seed.budget,
                fees_in_usa: seed.fees_in_usa,
                fees_in_world: seed.fees_in_world,
                category: seed.category.clone(),
                url: seed.url.clone(),
            },
            directors: tables.credits(&seed.directors),
            actors: tables.credits(&seed.actors),
            genres: seed.genres.clone(),
            reviews,
        }))
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        let mut actors = self.tables.lock().await.actors.clone();
        actors.sort_by_key(|a| a.id);
        Ok(actors)
    }

    async fn get_actor(&self, actor_id: i64) -> Result<Option<Actor>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.actors.iter().find(|a| a.id == actor_id).cloned())
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.movie(review.movie_id).is_none() {
            return Err(StoreError::MovieNotFound(review.movie_id));
        }

        if let Some(parent_id) = review.parent_id {
            let parent = tables
                .reviews
                .iter()
                .find(|r| r.id == parent_id)
                .ok_or(StoreError::ParentNotFound(parent_id))?;
            if parent.movie_id != review.movie_id {
                return Err(StoreError::ParentMovieMismatch {
                    parent: parent_id,
                    parent_movie: parent.movie_id,
                    movie: review.movie_id,
                });
            }

            let depth = tables.review_depth(parent_id);
            if depth >= MAX_REVIEW_DEPTH {
                return Err(StoreError::ReplyTooDeep {
                    parent: parent_id,
                    depth,
                });
            }
        }

        let created = Review {
            id: next_id(&mut tables.review_seq),
            movie_id: review.movie_id,
            email: review.email,
            name: review.name,
            text: review.text,
            parent_id: review.parent_id,
        };
        tables.reviews.push(created.clone());

        Ok(created)
    }

    async fn upsert_rating(&self, ip: &str, movie_id: i64, star: i32) -> Result<Rating, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.movie(movie_id).is_none() {
            return Err(StoreError::MovieNotFound(movie_id));
        }

        if let Some(existing) = tables
            .ratings
            .iter_mut()
            .find(|r| r.movie_id == movie_id && r.ip == ip)
        {
            existing.star = star;
            return Ok(existing.clone());
        }

        let rating = Rating {
            id: next_id(&mut tables.rating_seq),
            movie_id,
            ip: ip.to_string(),
            star,
        };
        tables.ratings.push(rating.clone());

        Ok(rating)
    }
}
