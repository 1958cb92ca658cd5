use std::sync::Arc;

use crate::services::{MetadataProvider, RatingStore, RecommendationAggregator, Recommender};

/// Shared application state
pub struct AppState {
    pub metadata: Arc<dyn MetadataProvider>,
    pub ratings: Arc<dyn RatingStore>,
    pub aggregator: RecommendationAggregator,
    /// List size of model-based recommendations when the request does not say
    pub default_top_n: usize,
}

impl AppState {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        recommender: Arc<dyn Recommender>,
        ratings: Arc<dyn RatingStore>,
        default_top_n: usize,
    ) -> Self {
        let aggregator =
            RecommendationAggregator::new(metadata.clone(), recommender, ratings.clone());
        Self {
            metadata,
            ratings,
            aggregator,
            default_top_n,
        }
    }
}
