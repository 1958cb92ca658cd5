//! TMDb (The Movie Database) metadata provider
//!
//! API Flow:
//! 1. Movie details: /movie/{id} → full movie record including `genres`
//! 2. Discovery: /discover/movie?with_genres={id} → first page of matching movies
//!
//! Every call carries the API key as the `api_key` query parameter. Responses
//! are cached in Redis when a cache is configured.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{DiscoverPage, MovieRecord},
    services::providers::MetadataProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const MOVIE_CACHE_TTL: u64 = 86400; // 1 day
const DISCOVER_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn movie_url(&self, movie_id: i64) -> String {
        format!("{}/movie/{}", self.api_url, movie_id)
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie", self.api_url)
    }

    /// Sends a GET with the API key and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        resource: &str,
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                resource = %resource,
                status = %status,
                body = %body,
                "TMDb request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn request_movie(&self, movie_id: i64) -> AppResult<MovieRecord> {
        let movie: MovieRecord = self
            .get_json(
                &self.movie_url(movie_id),
                &[],
                &format!("movie {}", movie_id),
            )
            .await?;

        tracing::debug!(movie_id, provider = "tmdb", "Movie fetched");
        Ok(movie)
    }

    async fn request_discover(&self, genre_id: i64) -> AppResult<Vec<MovieRecord>> {
        let page: DiscoverPage = self
            .get_json(
                &self.discover_url(),
                &[("with_genres", genre_id.to_string())],
                &format!("genre {}", genre_id),
            )
            .await?;

        tracing::debug!(
            genre_id,
            results = page.results.len(),
            total_results = page.total_results,
            provider = "tmdb",
            "Discover completed"
        );
        Ok(page.results)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_movie(&self, movie_id: i64) -> AppResult<MovieRecord> {
        cached!(
            self.cache,
            CacheKey::Movie(movie_id),
            MOVIE_CACHE_TTL,
            self.request_movie(movie_id)
        )
    }

    async fn discover_by_genre(&self, genre_id: i64) -> AppResult<Vec<MovieRecord>> {
        cached!(
            self.cache,
            CacheKey::Discover(genre_id),
            DISCOVER_CACHE_TTL,
            self.request_discover(genre_id)
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
