//! Movie metadata provider abstraction
//!
//! The TMDb client is the only production implementation; the trait is the
//! seam the aggregator is tested through.
use crate::{error::AppResult, models::MovieRecord};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the full record of one movie
    ///
    /// Fails with `NotFound` for unknown ids and with a network error when the
    /// provider cannot be reached or answers with an unexpected status.
    async fn fetch_movie(&self, movie_id: i64) -> AppResult<MovieRecord>;

    /// Fetch the first page of movies tagged with a genre
    async fn discover_by_genre(&self, genre_id: i64) -> AppResult<Vec<MovieRecord>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
