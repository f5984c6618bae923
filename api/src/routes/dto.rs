//! API response DTOs for the catalog

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::actors::{Actor, ActorRole, ActorSummary};
use crate::domain::movies::{MovieDetail, MovieSummary};
use crate::domain::ratings::Rating;
use crate::domain::reviews::{self, Review, ReviewNode};

/// Actor as shown in lists and movie credits
#[derive(Debug, Clone, Serialize)]
pub struct ActorListItem {
    pub id: i64,
    pub name: String,
    pub image: String,
}

impl From<ActorSummary> for ActorListItem {
    fn from(a: ActorSummary) -> Self {
        Self {
            id: a.id,
            name: a.name,
            image: a.image,
        }
    }
}

impl From<&Actor> for ActorListItem {
    fn from(a: &Actor) -> Self {
        ActorSummary::from(a).into()
    }
}

/// Actor detail response
#[derive(Debug, Clone, Serialize)]
pub struct ActorResponse {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub role: ActorRole,
    pub description: String,
    pub image: String,
}

impl From<Actor> for ActorResponse {
    fn from(a: Actor) -> Self {
        Self {
            id: a.id,
            name: a.name,
            age: a.age,
            role: a.role,
            description: a.description,
            image: a.image,
        }
    }
}

/// Movie list item response
#[derive(Debug, Clone, Serialize)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub category: Option<String>,
    pub rating_user: bool,
    pub middle_rating: Option<f64>,
}

impl From<MovieSummary> for MovieListItem {
    fn from(m: MovieSummary) -> Self {
        Self {
            id: m.id,
            title: m.title,
            tagline: m.tagline,
            category: m.category,
            rating_user: m.rating_user,
            middle_rating: m.middle_rating,
        }
    }
}

/// Movie detail response (everything except the draft flag)
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetailResponse {
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
    pub directors: Vec<ActorListItem>,
    pub actors: Vec<ActorListItem>,
    pub genres: Vec<String>,
    pub reviews: Vec<ReviewNode>,
}

impl From<MovieDetail> for MovieDetailResponse {
    fn from(d: MovieDetail) -> Self {
        let m = d.movie;
        Self {
            id: m.id,
            title: m.title,
            tagline: m.tagline,
            description: m.description,
            poster: m.poster,
            year: m.year,
            country: m.country,
            world_premiere: m.world_premiere,
            budget: m.budget,
            fees_in_usa: m.fees_in_usa,
            fees_in_world: m.fees_in_world,
            category: m.category,
            url: m.url,
            directors: d.directors.into_iter().map(Into::into).collect(),
            actors: d.actors.into_iter().map(Into::into).collect(),
            genres: d.genres,
            reviews: reviews::build_review_tree(d.reviews),
        }
    }
}

/// Created review response
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub movie: i64,
    pub email: String,
    pub name: String,
    pub text: String,
    pub parent: Option<i64>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            movie: r.movie_id,
            email: r.email,
            name: r.name,
            text: r.text,
            parent: r.parent_id,
        }
    }
}

/// Rating response after an upsert; the client IP is not echoed back
#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub movie: i64,
    pub star: i32,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            movie: r.movie_id,
            star: r.star,
        }
    }
}
