use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use reelrate_api::{
    create_router,
    models::{CandidateSource, MovieRecord, RecommendationCandidate},
    services::{MemoryRatingStore, MetadataProvider, Recommender},
    AppError, AppResult, AppState,
};

/// TMDb stand-in: known movies by id, discover results by genre
#[derive(Default)]
struct FakeMetadata {
    movies: HashMap<i64, MovieRecord>,
    discover: HashMap<i64, Vec<MovieRecord>>,
}

impl FakeMetadata {
    fn with_movie(mut self, id: i64, genres: &[i64]) -> Self {
        self.movies
            .insert(id, MovieRecord::with_id(id).with_genres(genres));
        self
    }

    fn with_discover(mut self, genre_id: i64, ids: &[i64]) -> Self {
        self.discover.insert(
            genre_id,
            ids.iter().map(|&id| MovieRecord::with_id(id)).collect(),
        );
        self
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FakeMetadata {
    async fn fetch_movie(&self, movie_id: i64) -> AppResult<MovieRecord> {
        self.movies
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))
    }

    async fn discover_by_genre(&self, genre_id: i64) -> AppResult<Vec<MovieRecord>> {
        self.discover
            .get(&genre_id)
            .cloned()
            .ok_or_else(|| AppError::ExternalApi(format!("genre {} unavailable", genre_id)))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Backend stand-in whose DQN model has nothing to offer
struct FakeRecommender;

#[async_trait::async_trait]
impl Recommender for FakeRecommender {
    async fn fetch_top_n(&self, _user_id: i64, n: usize) -> Vec<RecommendationCandidate> {
        [551, 999, 552]
            .iter()
            .take(n)
            .map(|&id| RecommendationCandidate::new(id, 4.0, CandidateSource::Scoring))
            .collect()
    }

    async fn fetch_top_k(&self, _user_id: i64, _k: usize) -> Vec<RecommendationCandidate> {
        Vec::new()
    }

    async fn fetch_single_best(&self, _user_id: i64) -> Option<RecommendationCandidate> {
        None
    }
}

fn default_metadata() -> FakeMetadata {
    FakeMetadata::default()
        .with_movie(550, &[18])
        .with_movie(551, &[18])
        .with_movie(552, &[18, 53])
        .with_discover(18, &[551, 552])
        .with_discover(53, &[552, 553])
}

fn create_test_server_with(store: MemoryRatingStore) -> TestServer {
    let state = AppState::new(
        Arc::new(default_metadata()),
        Arc::new(FakeRecommender),
        Arc::new(store),
        10,
    );
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(MemoryRatingStore::new())
}

fn email_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-email"),
        HeaderValue::from_static("fan@example.com"),
    )
}

fn user_id_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_static("42"),
    )
}

fn ids(values: &Value) -> Vec<i64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_get_movie() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/550").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["id"], 550);

    let response = server.get("/api/v1/movies/1").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("movie 1"));
}

#[tokio::test]
async fn test_discover() {
    let server = create_test_server();
    let response = server.get("/api/v1/discover?with_genres=18").await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json::<Value>()), vec![551, 552]);
}

#[tokio::test]
async fn test_rating_requires_session() {
    let server = create_test_server();
    let response = server
        .put("/api/v1/ratings/550")
        .json(&json!({ "rating": 4 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_out_of_range_rejected() {
    let server = create_test_server();

    for rating in [json!(0), json!(6), json!(300), json!(-1), json!(4.5), json!("4")] {
        let (name, value) = email_header();
        let response = server
            .put("/api/v1/ratings/550")
            .add_header(name, value)
            .json(&json!({ "rating": rating }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string(), "rating {} gave {}", rating, body);
    }

    let (name, value) = email_header();
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    assert_eq!(response.json::<Value>()["ratings"], json!([]));
}

#[tokio::test]
async fn test_rating_upsert_replaces_value() {
    let server = create_test_server();

    for (movie_id, rating) in [(550, 4), (13, 2), (550, 1)] {
        let (name, value) = email_header();
        let response = server
            .put(&format!("/api/v1/ratings/{}", movie_id))
            .add_header(name, value)
            .json(&json!({ "rating": rating }))
            .await;
        response.assert_status_ok();
    }

    let (name, value) = email_header();
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    response.assert_status_ok();
    let record: Value = response.json();
    assert_eq!(record["userKey"], "fan@example.com");
    assert_eq!(
        record["ratings"],
        json!([{ "id": 550, "rating": 1 }, { "id": 13, "rating": 2 }])
    );

    let (name, value) = email_header();
    let response = server
        .get("/api/v1/ratings/550")
        .add_header(name, value)
        .await;
    assert_eq!(response.json::<Value>(), json!({ "movieId": 550, "rating": 1 }));

    let (name, value) = email_header();
    let response = server
        .get("/api/v1/ratings/77")
        .add_header(name, value)
        .await;
    assert_eq!(response.json::<Value>()["rating"], 0);
}

#[tokio::test]
async fn test_recommendations_without_session() {
    let server = create_test_server();
    let response = server.get("/api/v1/recommendations").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "movieRatings": [], "relatedMovies": [], "user": null })
    );
}

#[tokio::test]
async fn test_recommendations_without_ratings() {
    let server = create_test_server();
    let (name, value) = email_header();
    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let result: Value = response.json();
    assert_eq!(result["movieRatings"], json!([]));
    assert_eq!(result["relatedMovies"], json!([]));
    assert_eq!(result["user"]["email"], "fan@example.com");
}

#[tokio::test]
async fn test_recommendations_from_rated_genres() {
    let store = MemoryRatingStore::new();
    let server = create_test_server_with(store.clone());

    let (name, value) = email_header();
    server
        .put("/api/v1/ratings/550")
        .add_header(name, value)
        .json(&json!({ "rating": 4 }))
        .await
        .assert_status_ok();

    let (name, value) = email_header();
    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let result: Value = response.json();
    assert_eq!(result["movieRatings"][0]["userRating"], 4);
    assert_eq!(result["movieRatings"][0]["movieInfo"]["id"], 550);
    assert_eq!(ids(&result["relatedMovies"]), vec![551, 552]);

    let saved = store.related_movies("fan@example.com").await.unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn test_model_recommendations_filter_failed_lookups() {
    let server = create_test_server();
    let (email, email_value) = email_header();
    let (user_id, user_id_value) = user_id_header();

    let response = server
        .get("/api/v1/recommendations/model?strategy=top_n&n=3")
        .add_header(email, email_value)
        .add_header(user_id, user_id_value)
        .await;
    response.assert_status_ok();

    let movies: Value = response.json();
    // 999 is unknown to the metadata provider
    assert_eq!(ids(&movies), vec![551, 552]);
    assert_eq!(movies[0]["recommendedBy"], "scoring");
}

#[tokio::test]
async fn test_model_recommendations_dqn_without_pick() {
    let server = create_test_server();
    let (email, email_value) = email_header();
    let (user_id, user_id_value) = user_id_header();

    let response = server
        .get("/api/v1/recommendations/model?strategy=dqn")
        .add_header(email, email_value)
        .add_header(user_id, user_id_value)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_model_recommendations_without_user_id() {
    let server = create_test_server();
    let (name, value) = email_header();
    let response = server
        .get("/api/v1/recommendations/model")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}
