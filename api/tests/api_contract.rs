use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::ServiceExt;

use movies_api::config::{AppConfig, StoreBackend};
use movies_api::constants::MAX_REVIEW_DEPTH;
use movies_api::domain::actors::ActorRole;
use movies_api::store::{MemoryStore, SeedActor, SeedMovie};
use movies_api::{AppState, build_app};

const PEER: &str = "198.51.100.20:40000";

struct Catalog {
    store: Arc<MemoryStore>,
    app: Router,
}

fn test_config() -> AppConfig {
    AppConfig {
        store_backend: StoreBackend::Memory,
        rate_limit_burst: 1000,
        rate_limit_replenish_secs: 1,
        ..AppConfig::default()
    }
}

fn movie(title: &str, year: i32, genres: &[&str]) -> SeedMovie {
    SeedMovie {
        title: title.to_string(),
        tagline: format!("{title} tagline"),
        description: format!("About {title}"),
        poster: format!("movies/{}.jpg", title.to_lowercase()),
        year,
        country: "USA".to_string(),
        world_premiere: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
        category: Some("Feature film".to_string()),
        url: title.to_lowercase().replace(' ', "-"),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ..Default::default()
    }
}

async fn catalog() -> Catalog {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(AppState::new(store.clone(), test_config()));
    Catalog { store, app }
}

impl Catalog {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.get_from(uri, None).await
    }

    async fn get_from(&self, uri: &str, forwarded_for: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::get(uri).header(header::HOST, "testserver");
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(PEER.parse::<SocketAddr>().unwrap()));
        self.send(request).await
    }

    async fn post(&self, uri: &str, forwarded_for: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut request = builder.body(Body::from(body.to_string())).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(PEER.parse::<SocketAddr>().unwrap()));
        self.send(request).await
    }
}

fn titles(page: &Value) -> Vec<String> {
    page["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let catalog = catalog().await;
    let (status, body) = catalog.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn drafts_are_absent_from_list_and_detail() {
    let catalog = catalog().await;
    let published = catalog.store.add_movie(movie("Heat", 1995, &["Crime"])).await;
    let draft = catalog
        .store
        .add_movie(SeedMovie {
            draft: true,
            ..movie("Heat 2", 2026, &["Crime"])
        })
        .await;

    let (status, page) = catalog.get("/api/movie/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(titles(&page), vec!["Heat"]);

    let (status, _) = catalog.get(&format!("/api/movie/{published}/")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = catalog.get(&format!("/api/movie/{draft}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn list_pages_two_at_a_time_with_links() {
    let catalog = catalog().await;
    for (title, year) in [("A", 2001), ("B", 2002), ("C", 2003)] {
        catalog.store.add_movie(movie(title, year, &["Drama"])).await;
    }

    let (status, first) = catalog.get("/api/movie/?genres=Drama").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 3);
    assert_eq!(titles(&first), vec!["A", "B"]);
    assert_eq!(
        first["links"]["next"],
        json!("http://testserver/api/movie/?genres=Drama&page=2")
    );
    assert_eq!(first["links"]["previous"], Value::Null);

    let (_, second) = catalog.get("/api/movie/?genres=Drama&page=2").await;
    assert_eq!(titles(&second), vec!["C"]);
    assert_eq!(second["links"]["next"], Value::Null);
    assert_eq!(
        second["links"]["previous"],
        json!("http://testserver/api/movie/?genres=Drama")
    );

    let (status, body) = catalog.get("/api/movie/?page=3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Invalid page." }));
}

#[tokio::test]
async fn page_size_is_capped_at_one_hundred() {
    let catalog = catalog().await;
    for n in 0..105 {
        catalog
            .store
            .add_movie(movie(&format!("Movie {n}"), 2000, &[]))
            .await;
    }

    let (status, page) = catalog.get("/api/movie/?page_size=1000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 105);
    assert_eq!(page["result"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn genre_filter_is_a_union_without_duplicates() {
    let catalog = catalog().await;
    catalog
        .store
        .add_movie(movie("Both", 2000, &["Horror", "Comedy"]))
        .await;
    catalog.store.add_movie(movie("Scary", 2001, &["Horror"])).await;
    catalog.store.add_movie(movie("Sad", 2002, &["Drama"])).await;

    let (status, page) = catalog
        .get("/api/movie/?genres=Horror,Comedy&page_size=10")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
    assert_eq!(titles(&page), vec!["Both", "Scary"]);
}

#[tokio::test]
async fn year_range_is_inclusive() {
    let catalog = catalog().await;
    for (title, year) in [("Old", 1980), ("Mid", 1990), ("New", 2000)] {
        catalog.store.add_movie(movie(title, year, &[])).await;
    }

    let (_, page) = catalog.get("/api/movie/?year_min=1990&year_max=2000").await;
    assert_eq!(titles(&page), vec!["Mid", "New"]);

    let (status, body) = catalog.get("/api/movie/?year_min=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("year_min").is_some());
}

#[tokio::test]
async fn rating_resubmission_overwrites_and_annotates_the_list() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Rated", 2010, &[])).await;

    let (_, page) = catalog.get_from("/api/movie/", Some("203.0.113.9")).await;
    assert_eq!(page["result"][0]["rating_user"], false);
    assert_eq!(page["result"][0]["middle_rating"], Value::Null);

    let (status, body) = catalog
        .post("/api/rating/", Some("203.0.113.9"), json!({ "movie": movie_id, "star": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "movie": movie_id, "star": 2 }));

    let (status, _) = catalog
        .post("/api/rating/", Some("203.0.113.9, 10.0.0.1"), json!({ "movie": movie_id, "star": 5 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let ratings = catalog.store.ratings().await;
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].ip, "203.0.113.9");
    assert_eq!(ratings[0].star, 5);

    // Peer address rates separately when no proxy header is present
    catalog
        .post("/api/rating/", None, json!({ "movie": movie_id, "star": 4 }))
        .await;
    assert_eq!(catalog.store.ratings().await.len(), 2);

    let (_, page) = catalog.get_from("/api/movie/", Some("203.0.113.9")).await;
    assert_eq!(page["result"][0]["rating_user"], true);
    assert_eq!(page["result"][0]["middle_rating"], 4.5);

    let (_, page) = catalog.get_from("/api/movie/", Some("192.0.2.1")).await;
    assert_eq!(page["result"][0]["rating_user"], false);
}

#[tokio::test]
async fn rating_is_validated() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Rated", 2010, &[])).await;

    let (status, body) = catalog
        .post("/api/rating/", None, json!({ "movie": movie_id, "star": 9 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("star").is_some());

    let (status, body) = catalog
        .post("/api/rating/", None, json!({ "movie": 999, "star": 3 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "movie": ["Invalid pk \"999\" - object does not exist."] })
    );
    assert!(catalog.store.ratings().await.is_empty());
}

#[tokio::test]
async fn replies_nest_under_their_parent_only() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Talked About", 2015, &[])).await;

    let (status, root) = catalog
        .post(
            "/api/review/",
            None,
            json!({ "movie": movie_id, "email": "a@example.com", "name": "Ann", "text": "Great" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(root["parent"], Value::Null);
    let root_id = root["id"].as_i64().unwrap();

    let (status, reply) = catalog
        .post(
            "/api/review/",
            None,
            json!({
                "movie": movie_id,
                "email": "b@example.com",
                "name": "Bob",
                "text": "Agreed",
                "parent": root_id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parent"], root_id);

    let (_, detail) = catalog.get(&format!("/api/movie/{movie_id}/")).await;
    let reviews = detail["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["name"], "Ann");
    assert_eq!(reviews[0]["children"][0]["name"], "Bob");
    assert_eq!(reviews[0]["children"][0]["children"], json!([]));
    assert!(detail.get("draft").is_none());
}

#[tokio::test]
async fn review_errors_are_per_field() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Quiet", 2015, &[])).await;

    let (status, body) = catalog
        .post(
            "/api/review/",
            None,
            json!({ "movie": movie_id, "email": "nope", "name": "", "text": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("email").is_some());
    assert!(body.get("name").is_some());
    assert!(body.get("text").is_none());

    let (status, body) = catalog
        .post(
            "/api/review/",
            None,
            json!({ "movie": movie_id, "email": "a@example.com", "name": "Ann", "text": "Hi", "parent": 77 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("parent").is_some());
}

#[tokio::test]
async fn actors_list_and_detail() {
    let catalog = catalog().await;
    let director = catalog
        .store
        .add_actor(SeedActor {
            name: "Michael Mann".to_string(),
            age: 81,
            role: ActorRole::Director,
            description: "Director of Heat.".to_string(),
            image: "actors/mann.jpg".to_string(),
        })
        .await;
    let lead = catalog
        .store
        .add_actor(SeedActor {
            name: "Al Pacino".to_string(),
            age: 84,
            ..Default::default()
        })
        .await;
    let movie_id = catalog
        .store
        .add_movie(SeedMovie {
            directors: vec![director],
            actors: vec![lead],
            ..movie("Heat", 1995, &["Crime"])
        })
        .await;

    let (status, actors) = catalog.get("/api/actors/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actors.as_array().unwrap().len(), 2);
    assert_eq!(
        actors[0],
        json!({ "id": director, "name": "Michael Mann", "image": "actors/mann.jpg" })
    );

    let (status, actor) = catalog.get(&format!("/api/actors/{director}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actor["role"], "director");
    assert_eq!(actor["age"], 81);

    let (status, _) = catalog.get("/api/actors/4040").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = catalog.get(&format!("/api/movie/{movie_id}/")).await;
    assert_eq!(detail["directors"][0]["name"], "Michael Mann");
    assert_eq!(detail["actors"][0]["name"], "Al Pacino");
    assert_eq!(detail["genres"], json!(["Crime"]));
    assert_eq!(detail["world_premiere"], "1995-06-01");
}

#[tokio::test]
async fn reply_chains_stop_at_max_depth() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Threaded", 2018, &[])).await;

    let mut parent = Value::Null;
    for level in 1..=MAX_REVIEW_DEPTH {
        let (status, review) = catalog
            .post(
                "/api/review/",
                Some(&format!("203.0.113.{}", level % 250)),
                json!({
                    "movie": movie_id,
                    "email": "deep@example.com",
                    "name": format!("level {level}"),
                    "text": "reply",
                    "parent": parent
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "level {level}");
        parent = review["id"].clone();
    }

    let (status, body) = catalog
        .post(
            "/api/review/",
            None,
            json!({
                "movie": movie_id,
                "email": "deep@example.com",
                "name": "one too many",
                "text": "reply",
                "parent": parent
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("parent").is_some());

    let (status, detail) = catalog.get(&format!("/api/movie/{movie_id}/")).await;
    assert_eq!(status, StatusCode::OK);
    let mut depth = 0;
    let mut level = &detail["reviews"];
    while let Some(node) = level.get(0) {
        depth += 1;
        level = &node["children"];
    }
    assert_eq!(depth, MAX_REVIEW_DEPTH);
}

#[tokio::test]
async fn incomplete_bodies_get_json_field_errors() {
    let catalog = catalog().await;
    let movie_id = catalog.store.add_movie(movie("Rated", 2010, &[])).await;

    let (status, body) = catalog
        .post("/api/rating/", None, json!({ "movie": movie_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "star": ["This field is required."] }));

    let (status, body) = catalog
        .post("/api/review/", None, json!({ "movie": movie_id, "text": "Hi" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!(["This field is required."]));
    assert_eq!(body["name"], json!(["This field is required."]));

    let mut request = Request::post("/api/rating/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"movie\": 1, \"star\":"))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(PEER.parse::<SocketAddr>().unwrap()));
    let (status, body) = catalog.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert!(catalog.store.ratings().await.is_empty());
}

#[tokio::test]
async fn last_page_is_addressable() {
    let catalog = catalog().await;
    for (title, year) in [("A", 2001), ("B", 2002), ("C", 2003)] {
        catalog.store.add_movie(movie(title, year, &[])).await;
    }

    let (status, page) = catalog.get("/api/movie/?page=last").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), vec!["C"]);
    assert_eq!(page["links"]["next"], Value::Null);
    assert_eq!(page["links"]["previous"], json!("http://testserver/api/movie/"));
}
