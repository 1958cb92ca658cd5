pub mod movie;
pub mod rating;
pub mod recommendation;
pub mod session;

pub use movie::{DiscoverPage, Genre, MovieRecord};
pub use rating::{Rating, RatingsDocument, UserRatingsRecord};
pub use recommendation::{
    AggregationResult, BackendItem, BackendListResponse, CandidateSource, DqnResponse,
    EnrichedMovie, ModelStrategy, RatedMovie, RecommendationCandidate, RecommendationsDocument,
};
pub use session::Session;
