//! Client for the model-serving recommendation backend
//!
//! Endpoints:
//! - `/recommend/{userId}?top_n=n` scoring model, top-N with normalized scores
//! - `/recommend_2/{userId}?top_k=n` second ranking model, top-K
//! - `/dqn_recommend/{userId}` reinforcement-learning model, single best pick
//!
//! The backend is best effort: any failure is logged and reported as "no
//! recommendations" so callers always degrade to an empty list.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{
        BackendListResponse, CandidateSource, DqnResponse, RecommendationCandidate,
    },
};

/// Trait for sources of ranked movie candidates
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Top-N candidates from the scoring model; empty on any failure
    async fn fetch_top_n(&self, user_id: i64, n: usize) -> Vec<RecommendationCandidate>;

    /// Top-K candidates from the ranking model; empty on any failure
    async fn fetch_top_k(&self, user_id: i64, k: usize) -> Vec<RecommendationCandidate>;

    /// Single best pick of the reinforcement-learning model; `None` on any failure
    async fn fetch_single_best(&self, user_id: i64) -> Option<RecommendationCandidate>;
}

#[derive(Clone)]
pub struct BackendRecommender {
    http_client: HttpClient,
    base_url: String,
}

impl BackendRecommender {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http_client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation backend returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn request_list(
        &self,
        path: String,
        query: &[(&str, String)],
        source: CandidateSource,
    ) -> AppResult<Vec<RecommendationCandidate>> {
        let response: BackendListResponse = self.get_json(&path, query).await?;
        list_candidates(response, source)
    }

    fn degrade<T: Default>(result: AppResult<T>, user_id: i64, endpoint: &'static str) -> T {
        result.unwrap_or_else(|e| {
            tracing::error!(
                error = %e,
                user_id,
                endpoint,
                "Recommendation backend failed, returning no recommendations"
            );
            T::default()
        })
    }
}

/// Converts a list response into candidates, dropping items without a TMDb id
fn list_candidates(
    response: BackendListResponse,
    source: CandidateSource,
) -> AppResult<Vec<RecommendationCandidate>> {
    match response {
        BackendListResponse::Items(items) => {
            let total = items.len();
            let candidates: Vec<_> = items
                .into_iter()
                .filter_map(|item| item.into_candidate(source))
                .collect();
            if candidates.len() < total {
                tracing::debug!(
                    dropped = total - candidates.len(),
                    "Skipped recommendations without a TMDb id"
                );
            }
            Ok(candidates)
        }
        BackendListResponse::Error { error } => Err(AppError::ExternalApi(error)),
    }
}

/// Interprets a DQN response; an error body or a missing id means no pick
fn dqn_candidate(response: DqnResponse) -> AppResult<Option<RecommendationCandidate>> {
    if let Some(error) = response.error {
        return Err(AppError::ExternalApi(error));
    }
    Ok(response
        .tmdb_id
        .map(|id| RecommendationCandidate::new(id, 1.0, CandidateSource::Dqn)))
}

#[async_trait::async_trait]
impl Recommender for BackendRecommender {
    async fn fetch_top_n(&self, user_id: i64, n: usize) -> Vec<RecommendationCandidate> {
        let result = self
            .request_list(
                format!("/recommend/{}", user_id),
                &[("top_n", n.to_string())],
                CandidateSource::Scoring,
            )
            .await;
        Self::degrade(result, user_id, "recommend")
    }

    async fn fetch_top_k(&self, user_id: i64, k: usize) -> Vec<RecommendationCandidate> {
        let result = self
            .request_list(
                format!("/recommend_2/{}", user_id),
                &[("top_k", k.to_string())],
                CandidateSource::Ranking,
            )
            .await;
        Self::degrade(result, user_id, "recommend_2")
    }

    async fn fetch_single_best(&self, user_id: i64) -> Option<RecommendationCandidate> {
        let result = self
            .get_json::<DqnResponse>(&format!("/dqn_recommend/{}", user_id), &[])
            .await
            .and_then(dqn_candidate);

        let candidate = Self::degrade(result, user_id, "dqn_recommend");
        if candidate.is_none() {
            tracing::warn!(user_id, "DQN returned no recommendation");
        }
        candidate
    }
}
