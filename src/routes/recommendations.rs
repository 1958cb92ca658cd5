use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    middleware::request_id::RequestId,
    models::{AggregationResult, EnrichedMovie, ModelStrategy, Session},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    #[serde(default)]
    pub strategy: ModelStrategy,
    pub n: Option<usize>,
}

/// Handler for genre-based recommendations
///
/// Anonymous requests get an empty result with a null user.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Option<Session>,
) -> Json<AggregationResult> {
    tracing::info!(
        request_id = %request_id,
        signed_in = session.is_some(),
        "Processing recommendation request"
    );

    Json(state.aggregator.aggregate_and_save(session.as_ref()).await)
}

/// Handler for model-based recommendations
///
/// Requests without a session or without a numeric user id get an empty list.
pub async fn recommend_model(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Option<Session>,
    Query(params): Query<ModelQuery>,
) -> Json<Vec<EnrichedMovie>> {
    let Some(user_id) = session.as_ref().and_then(|s| s.user_id) else {
        tracing::debug!(request_id = %request_id, "No model user id, returning no recommendations");
        return Json(Vec::new());
    };

    let n = params.n.unwrap_or(state.default_top_n);
    tracing::info!(
        request_id = %request_id,
        user_id,
        strategy = ?params.strategy,
        n,
        "Processing model recommendation request"
    );

    Json(
        state
            .aggregator
            .model_recommendations(user_id, params.strategy, n)
            .await,
    )
}
