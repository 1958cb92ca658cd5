use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Rating, Session, UserRatingsRecord},
    routes::AppState,
};

/// Body of a rating submission; `rating` is checked by `into_rating`
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: Number,
}

impl RatingRequest {
    fn into_rating(self, movie_id: i64) -> AppResult<Rating> {
        let value = self.rating.as_i64().ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Rating must be a whole number, got {}",
                self.rating
            ))
        })?;
        Rating::new(movie_id, value)
    }
}

/// The user's rating of one movie; 0 when not rated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRatingResponse {
    pub movie_id: i64,
    pub rating: u8,
}

/// Handler returning all ratings of the signed-in user
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> AppResult<Json<UserRatingsRecord>> {
    let record = state
        .ratings
        .get_ratings(&session.email)
        .await?
        .unwrap_or_else(|| UserRatingsRecord::new(session.email.as_str()));
    Ok(Json(record))
}

/// Handler returning the signed-in user's rating of one movie
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MovieRatingResponse>> {
    let rating = state
        .ratings
        .get_ratings(&session.email)
        .await?
        .and_then(|record| record.rating_for(movie_id))
        .unwrap_or(0);
    Ok(Json(MovieRatingResponse { movie_id, rating }))
}

/// Handler inserting or replacing the signed-in user's rating of one movie
pub async fn put_rating(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(movie_id): Path<i64>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> AppResult<Json<UserRatingsRecord>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let rating = request.into_rating(movie_id)?;

    tracing::info!(
        request_id = %request_id,
        user = %session.email,
        movie_id,
        rating = rating.rating,
        "Submitting rating"
    );

    let record = state.ratings.upsert_rating(&session.email, rating).await?;
    Ok(Json(record))
}
