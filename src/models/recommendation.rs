use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{MovieRecord, Session};

/// Which backend model produced a candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Scoring model behind `/recommend` (top-N with normalized scores)
    Scoring,
    /// Second ranking model behind `/recommend_2` (top-K)
    Ranking,
    /// Reinforcement-learning model behind `/dqn_recommend` (single best pick)
    Dqn,
}

/// Model-based recommendation strategy selectable by the caller
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelStrategy {
    #[default]
    TopN,
    TopK,
    Dqn,
}

/// A ranked movie suggestion from the recommendation backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCandidate {
    pub external_movie_id: i64,
    pub score: f64,
    pub original_score: Option<f64>,
    pub source: CandidateSource,
    pub genres_text: Option<String>,
    pub year: Option<i32>,
}

impl RecommendationCandidate {
    pub fn new(external_movie_id: i64, score: f64, source: CandidateSource) -> Self {
        Self {
            external_movie_id,
            score,
            original_score: None,
            source,
            genres_text: None,
            year: None,
        }
    }
}

/// Item of a `/recommend` or `/recommend_2` list
///
/// `tmdbId` is null for items without a TMDb link and `year` is the string
/// `"Unknown"` when the model has no year for the item.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendItem {
    #[serde(rename = "tmdbId", default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub original_score: Option<f64>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
}

impl BackendItem {
    /// Converts to a candidate; items without a TMDb id cannot be enriched and yield `None`
    pub fn into_candidate(self, source: CandidateSource) -> Option<RecommendationCandidate> {
        let external_movie_id = self.tmdb_id?;
        Some(RecommendationCandidate {
            external_movie_id,
            score: self.score.unwrap_or_default(),
            original_score: self.original_score,
            source,
            genres_text: self.genres,
            year: self.year,
        })
    }
}

/// A list endpoint answers with either the items or an `{"error": ..}` object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BackendListResponse {
    Items(Vec<BackendItem>),
    Error { error: String },
}

/// Response of `/dqn_recommend/{userId}`: `{"tmdbId": n}` or `{"error": ..}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DqnResponse {
    #[serde(rename = "tmdbId", default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .map(|y| y as i32))
}

/// A candidate merged with its full TMDb record, ready for the UI
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMovie {
    #[serde(flatten)]
    pub movie: MovieRecord,
    pub recommended_by: CandidateSource,
    pub custom_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl EnrichedMovie {
    pub fn new(candidate: RecommendationCandidate, movie: MovieRecord) -> Self {
        Self {
            movie,
            recommended_by: candidate.source,
            custom_score: candidate.score,
            original_score: candidate.original_score,
            genres_text: candidate.genres_text,
            year: candidate.year,
        }
    }
}

/// A rated movie with its metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatedMovie {
    pub user_rating: u8,
    pub movie_info: MovieRecord,
}

/// Outcome of one genre-based aggregation run
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub movie_ratings: Vec<RatedMovie>,
    pub related_movies: Vec<MovieRecord>,
    pub user: Option<Session>,
}

impl AggregationResult {
    pub fn empty(user: Option<Session>) -> Self {
        Self {
            movie_ratings: Vec::new(),
            related_movies: Vec::new(),
            user,
        }
    }
}

/// Body of a document in the `Recommendations` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsDocument {
    pub related_movies: Vec<MovieRecord>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_list_deserialization() {
        let json = r#"[
            {"item_id": 1, "title": "Toy Story (1995)", "genres": "Animation, Comedy",
             "year": 1995, "original_score": 2.31, "score": 5.0, "tmdbId": 862},
            {"item_id": 2, "title": "Odd One", "genres": "Drama",
             "year": "Unknown", "original_score": 0.1, "score": 1.0, "tmdbId": null}
        ]"#;

        let response: BackendListResponse = serde_json::from_str(json).unwrap();
        let BackendListResponse::Items(items) = response else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tmdb_id, Some(862));
        assert_eq!(items[0].year, Some(1995));
        assert_eq!(items[1].year, None);
        assert_eq!(items[1].tmdb_id, None);
    }

    #[test]
    fn test_recommend_error_object() {
        let json = r#"{"error": "User ID 42 does not exist"}"#;
        let response: BackendListResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response, BackendListResponse::Error { .. }));
    }

    #[test]
    fn test_item_without_tmdb_id_is_dropped() {
        let item: BackendItem = serde_json::from_str(r#"{"score": 3.0}"#).unwrap();
        assert!(item.into_candidate(CandidateSource::Scoring).is_none());
    }

    #[test]
    fn test_item_into_candidate() {
        let item: BackendItem = serde_json::from_str(
            r#"{"tmdbId": 862, "score": 4.5, "original_score": 1.2, "genres": "Comedy", "year": 1995}"#,
        )
        .unwrap();
        let candidate = item.into_candidate(CandidateSource::Scoring).unwrap();

        assert_eq!(candidate.external_movie_id, 862);
        assert_eq!(candidate.score, 4.5);
        assert_eq!(candidate.original_score, Some(1.2));
        assert_eq!(candidate.genres_text.as_deref(), Some("Comedy"));
        assert_eq!(candidate.year, Some(1995));
    }

    #[test]
    fn test_enriched_movie_flattens_record() {
        let mut candidate = RecommendationCandidate::new(862, 4.5, CandidateSource::Dqn);
        candidate.original_score = Some(1.2);
        let movie = MovieRecord::with_id(862);

        let value = serde_json::to_value(EnrichedMovie::new(candidate, movie)).unwrap();
        assert_eq!(value["id"], 862);
        assert_eq!(value["recommendedBy"], "dqn");
        assert_eq!(value["customScore"], 4.5);
        assert_eq!(value["originalScore"], 1.2);
        assert!(value.get("genresText").is_none());
    }

    #[test]
    fn test_model_strategy_from_query_value() {
        let strategy: ModelStrategy = serde_json::from_str(r#""top_k""#).unwrap();
        assert_eq!(strategy, ModelStrategy::TopK);
        assert_eq!(ModelStrategy::default(), ModelStrategy::TopN);
    }
}
