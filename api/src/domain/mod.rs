//! Catalog domain - models and Postgres queries

pub mod actors;
pub mod movies;
pub mod ratings;
pub mod reviews;
