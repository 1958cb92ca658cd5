use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppResult, models::MovieRecord, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    with_genres: i64,
}

/// Handler for movie detail endpoint
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MovieRecord>> {
    let movie = state.metadata.fetch_movie(movie_id).await?;
    Ok(Json(movie))
}

/// Handler for discover-by-genre endpoint
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let movies = state.metadata.discover_by_genre(params.with_genres).await?;
    Ok(Json(movies))
}
