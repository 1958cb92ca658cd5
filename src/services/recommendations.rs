use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{
        AggregationResult, EnrichedMovie, ModelStrategy, MovieRecord, RatedMovie,
        RecommendationCandidate, Session, UserRatingsRecord,
    },
    services::{
        fanout::{keep_successes, settle_all},
        providers::MetadataProvider,
        rating_store::RatingStore,
        recommender::Recommender,
    },
};

/// Builds personalized recommendation lists
///
/// Two independent paths are offered:
/// - genre based: the user's rated movies are looked up, the union of their
///   genres is run through "discover by genre" and the merged results are
///   deduplicated;
/// - model based: the recommendation backend proposes candidates that are
///   enriched with their TMDb records.
///
/// Neither path returns an error. Failed lookups are logged and omitted, a
/// failing rating store or backend yields empty lists.
#[derive(Clone)]
pub struct RecommendationAggregator {
    metadata: Arc<dyn MetadataProvider>,
    recommender: Arc<dyn Recommender>,
    ratings: Arc<dyn RatingStore>,
}

impl RecommendationAggregator {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        recommender: Arc<dyn Recommender>,
        ratings: Arc<dyn RatingStore>,
    ) -> Self {
        Self {
            metadata,
            recommender,
            ratings,
        }
    }

    /// Genre-based recommendations for the session's user
    pub async fn aggregate(&self, session: Option<&Session>) -> AggregationResult {
        let Some(session) = session else {
            tracing::debug!("No session, skipping aggregation");
            return AggregationResult::empty(None);
        };

        let record = match self.ratings.get_ratings(&session.email).await {
            Ok(Some(record)) if !record.is_empty() => record,
            Ok(_) => {
                tracing::debug!(user = %session.email, "User has no ratings");
                return AggregationResult::empty(Some(session.clone()));
            }
            Err(e) => {
                tracing::error!(error = %e, user = %session.email, "Failed to read ratings");
                return AggregationResult::empty(Some(session.clone()));
            }
        };

        let movie_ratings = self.rated_movies(&record).await;
        let genres = genre_set(&movie_ratings);
        let related_movies = self.related_movies(&genres).await;

        tracing::info!(
            user = %session.email,
            provider = self.metadata.name(),
            rated = movie_ratings.len(),
            genres = genres.len(),
            related = related_movies.len(),
            "Aggregation completed"
        );

        AggregationResult {
            movie_ratings,
            related_movies,
            user: Some(session.clone()),
        }
    }

    /// Runs [`RecommendationAggregator::aggregate`] and stores the related
    /// movies in the user's recommendations document
    ///
    /// The list is saved whenever rated movies were resolved, an empty one
    /// included, so the stored document never outlives the user's genres.
    /// A failed save is logged; the result is returned either way.
    pub async fn aggregate_and_save(&self, session: Option<&Session>) -> AggregationResult {
        let result = self.aggregate(session).await;

        if let Some(user) = &result.user {
            if !result.movie_ratings.is_empty() {
                if let Err(e) = self
                    .ratings
                    .save_related_movies(&user.email, &result.related_movies)
                    .await
                {
                    tracing::error!(error = %e, user = %user.email, "Failed to save related movies");
                }
            }
        }

        result
    }

    /// Model-based recommendations for a numeric user id
    pub async fn model_recommendations(
        &self,
        user_id: i64,
        strategy: ModelStrategy,
        n: usize,
    ) -> Vec<EnrichedMovie> {
        let candidates = match strategy {
            ModelStrategy::TopN => self.recommender.fetch_top_n(user_id, n).await,
            ModelStrategy::TopK => self.recommender.fetch_top_k(user_id, n).await,
            ModelStrategy::Dqn => self
                .recommender
                .fetch_single_best(user_id)
                .await
                .into_iter()
                .collect(),
        };

        if candidates.is_empty() {
            return Vec::new();
        }

        let enriched = self.enrich(dedup_candidates(candidates)).await;

        tracing::info!(
            user_id,
            provider = self.metadata.name(),
            strategy = ?strategy,
            recommendations = enriched.len(),
            "Model recommendations completed"
        );

        enriched
    }

    /// Looks up every rated movie in parallel; failed lookups are dropped
    async fn rated_movies(&self, record: &UserRatingsRecord) -> Vec<RatedMovie> {
        let lookups = record.ratings.iter().map(|rating| {
            let metadata = Arc::clone(&self.metadata);
            let rating = *rating;
            async move {
                let movie = metadata.fetch_movie(rating.movie_id).await?;
                Ok::<_, AppError>(RatedMovie {
                    user_rating: rating.rating,
                    movie_info: movie,
                })
            }
        });

        keep_successes(settle_all(lookups).await, "rated movie")
    }

    /// Discovers movies for every genre in parallel and merges them by id
    async fn related_movies(&self, genres: &BTreeSet<i64>) -> Vec<MovieRecord> {
        let lookups = genres.iter().map(|&genre_id| {
            let metadata = Arc::clone(&self.metadata);
            async move { metadata.discover_by_genre(genre_id).await }
        });

        let pages = keep_successes(settle_all(lookups).await, "genre discovery");
        dedup_movies(pages.into_iter().flatten())
    }

    /// Fetches the TMDb record of every candidate in parallel
    async fn enrich(&self, candidates: Vec<RecommendationCandidate>) -> Vec<EnrichedMovie> {
        let lookups = candidates.into_iter().map(|candidate| {
            let metadata = Arc::clone(&self.metadata);
            async move {
                let movie = metadata.fetch_movie(candidate.external_movie_id).await?;
                Ok::<_, AppError>(EnrichedMovie::new(candidate, movie))
            }
        });

        keep_successes(settle_all(lookups).await, "recommended movie")
    }
}

/// Union of the genre ids of all rated movies
fn genre_set(rated: &[RatedMovie]) -> BTreeSet<i64> {
    rated
        .iter()
        .flat_map(|rated| rated.movie_info.genre_ids())
        .collect()
}

/// One movie per id, later duplicates replace earlier ones; ordered by id
fn dedup_movies(movies: impl IntoIterator<Item = MovieRecord>) -> Vec<MovieRecord> {
    let mut by_id = BTreeMap::new();
    for movie in movies {
        by_id.insert(movie.id, movie);
    }
    by_id.into_values().collect()
}

/// Drops repeated candidate ids, keeping the first (best ranked) occurrence
fn dedup_candidates(candidates: Vec<RecommendationCandidate>) -> Vec<RecommendationCandidate> {
    let mut seen = BTreeSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.external_movie_id))
        .collect()
}
