pub mod fanout;
pub mod providers;
pub mod rating_store;
pub mod recommendations;
pub mod recommender;

pub use providers::{MetadataProvider, TmdbProvider};
pub use rating_store::{MemoryRatingStore, PgRatingStore, RatingStore};
pub use recommendations::RecommendationAggregator;
pub use recommender::{BackendRecommender, Recommender};
