use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// TMDb genre as embedded in a movie detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A movie record as returned by the TMDb API
///
/// Detail responses (`/movie/{id}`) carry `genres`, discover results carry
/// `genre_ids`. Fields not modelled here are kept in `extra` so the record can
/// be handed back to the UI unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieRecord {
    /// Bare record carrying only an id; used by tests and fakes.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            title: None,
            overview: None,
            genres: Vec::new(),
            genre_ids: Vec::new(),
            release_date: None,
            poster_path: None,
            vote_average: None,
            vote_count: None,
            extra: Map::new(),
        }
    }

    pub fn with_genres(mut self, genre_ids: &[i64]) -> Self {
        self.genres = genre_ids
            .iter()
            .map(|&id| Genre { id, name: None })
            .collect();
        self
    }

    /// Genre identifiers from whichever of the two TMDb shapes is present
    pub fn genre_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.genres
            .iter()
            .map(|g| g.id)
            .chain(self.genre_ids.iter().copied())
    }
}

/// Page of results from `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieRecord>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}
