use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    db::DocumentStore,
    error::AppResult,
    models::{MovieRecord, Rating, RatingsDocument, RecommendationsDocument, UserRatingsRecord},
};

/// Collection holding one ratings document per user email
pub const RATINGS_COLLECTION: &str = "movieRatings";
/// Collection holding the last related-movies list computed for each user
pub const RECOMMENDATIONS_COLLECTION: &str = "Recommendations";

/// Persistence of per-user movie ratings
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// The user's ratings, `None` when the user never rated anything
    async fn get_ratings(&self, user_key: &str) -> AppResult<Option<UserRatingsRecord>>;

    /// Inserts or replaces the user's rating for `rating.movie_id`
    ///
    /// Creates the user's record on first use and returns the updated record.
    async fn upsert_rating(&self, user_key: &str, rating: Rating) -> AppResult<UserRatingsRecord>;

    /// Stores the related movies last computed for the user
    async fn save_related_movies(&self, user_key: &str, movies: &[MovieRecord]) -> AppResult<()>;
}

/// Rating store backed by the PostgreSQL document store
#[derive(Clone)]
pub struct PgRatingStore {
    documents: DocumentStore,
}

impl PgRatingStore {
    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }
}

#[async_trait::async_trait]
impl RatingStore for PgRatingStore {
    async fn get_ratings(&self, user_key: &str) -> AppResult<Option<UserRatingsRecord>> {
        let document: Option<RatingsDocument> = self
            .documents
            .get_document(RATINGS_COLLECTION, user_key)
            .await?;

        Ok(document.map(|doc| UserRatingsRecord {
            user_key: user_key.to_string(),
            ratings: doc.movie_ratings,
        }))
    }

    async fn upsert_rating(&self, user_key: &str, rating: Rating) -> AppResult<UserRatingsRecord> {
        // row lock held until commit, so concurrent submissions for one user serialize
        let (tx, document): (_, RatingsDocument) = self
            .documents
            .lock_document(RATINGS_COLLECTION, user_key)
            .await?;

        let mut record = UserRatingsRecord {
            user_key: user_key.to_string(),
            ratings: document.movie_ratings,
        };
        record.upsert(rating);

        let patch = RatingsDocument {
            movie_ratings: record.ratings.clone(),
        };
        DocumentStore::commit_document(tx, RATINGS_COLLECTION, user_key, &patch).await?;

        tracing::info!(
            user = %user_key,
            movie_id = rating.movie_id,
            rating = rating.rating,
            total = record.ratings.len(),
            "Rating saved"
        );

        Ok(record)
    }

    async fn save_related_movies(&self, user_key: &str, movies: &[MovieRecord]) -> AppResult<()> {
        let document = RecommendationsDocument {
            related_movies: movies.to_vec(),
            updated_at: Utc::now(),
        };
        self.documents
            .merge_document(RECOMMENDATIONS_COLLECTION, user_key, &document)
            .await
    }
}

/// Rating store kept in process memory
///
/// Used when no database is configured and in tests. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryRatingStore {
    ratings: Arc<RwLock<HashMap<String, UserRatingsRecord>>>,
    related: Arc<RwLock<HashMap<String, RecommendationsDocument>>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The related movies last saved for a user
    pub async fn related_movies(&self, user_key: &str) -> Option<Vec<MovieRecord>> {
        self.related
            .read()
            .await
            .get(user_key)
            .map(|doc| doc.related_movies.clone())
    }
}

#[async_trait::async_trait]
impl RatingStore for MemoryRatingStore {
    async fn get_ratings(&self, user_key: &str) -> AppResult<Option<UserRatingsRecord>> {
        Ok(self.ratings.read().await.get(user_key).cloned())
    }

    async fn upsert_rating(&self, user_key: &str, rating: Rating) -> AppResult<UserRatingsRecord> {
        let mut ratings = self.ratings.write().await;
        let record = ratings
            .entry(user_key.to_string())
            .or_insert_with(|| UserRatingsRecord::new(user_key));
        record.upsert(rating);
        Ok(record.clone())
    }

    async fn save_related_movies(&self, user_key: &str, movies: &[MovieRecord]) -> AppResult<()> {
        self.related.write().await.insert(
            user_key.to_string(),
            RecommendationsDocument {
                related_movies: movies.to_vec(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}
