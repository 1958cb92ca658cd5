use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A user's score for one movie
///
/// Stored as `{"id": <tmdb id>, "rating": <1..=5>}` inside the user's ratings document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    #[serde(rename = "id", alias = "movieId")]
    pub movie_id: i64,
    pub rating: u8,
}

impl Rating {
    /// Creates a rating, rejecting values outside 1..=5
    pub fn new(movie_id: i64, rating: i64) -> AppResult<Self> {
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Rating must be between {} and {}, got {}",
                    MIN_RATING, MAX_RATING, rating
                ))
            })?;
        Ok(Self { movie_id, rating })
    }
}

/// All ratings of one user, keyed by the user's email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingsRecord {
    pub user_key: String,
    pub ratings: Vec<Rating>,
}

impl UserRatingsRecord {
    pub fn new(user_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            ratings: Vec::new(),
        }
    }

    /// Replaces the rating for `rating.movie_id` if present, appends otherwise
    pub fn upsert(&mut self, rating: Rating) {
        match self
            .ratings
            .iter_mut()
            .find(|existing| existing.movie_id == rating.movie_id)
        {
            Some(existing) => existing.rating = rating.rating,
            None => self.ratings.push(rating),
        }
    }

    pub fn rating_for(&self, movie_id: i64) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.movie_id == movie_id)
            .map(|r| r.rating)
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Body of a document in the `movieRatings` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingsDocument {
    #[serde(rename = "movieRatings", default)]
    pub movie_ratings: Vec<Rating>,
}
