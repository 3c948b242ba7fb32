//! Core domain types for the movie catalog and rating history.
//!
//! Two families of records live here:
//! - raw rows as they come out of the metadata/ratings tables, before any
//!   coercion or quality filtering (`RawMovieRecord`, `RawRating`)
//! - validated records the rest of the system works with (`RatingEvent`,
//!   `CatalogItem`, `User`)

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Numeric identifier for a rating author in the ratings table
pub type UserId = u32;

/// Numeric identifier for a movie in the ratings/metadata tables
pub type MovieId = u32;

/// Identifier of an item in the display catalog.
///
/// The catalog and user stores key movies by opaque strings, unlike the
/// numeric ids of the rating history.
pub type ItemId = String;

// =============================================================================
// Raw table rows
// =============================================================================

/// One row of the movie metadata table, as read.
///
/// Every field except `id` may be missing; `id` is kept as text because the
/// metadata table contains rows whose id column is not numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMovieRecord {
    pub id: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub vote_count: Option<f64>,

    // Display metadata, only used when hydrating similarity results
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<f64>,
    pub vote_average: Option<f64>,
    /// Stringified list of `{'id': .., 'name': ..}` dicts
    pub genres: Option<String>,
    pub poster_path: Option<String>,
}

impl RawMovieRecord {
    /// Minimal record carrying only the fields the rating matrix needs
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        language: impl Into<String>,
        vote_count: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            language: Some(language.into()),
            vote_count: Some(vote_count),
            ..Self::default()
        }
    }
}

/// One row of the ratings table, before the movie id is coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRating {
    pub user_id: UserId,
    pub movie_id: String,
    pub rating: f32,
}

impl RawRating {
    pub fn new(user_id: UserId, movie_id: impl Into<String>, rating: f32) -> Self {
        Self {
            user_id,
            movie_id: movie_id.into(),
            rating,
        }
    }
}

/// A single rating from a user for a movie, after id coercion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: UserId,
    pub item_id: MovieId,
    pub rating: f32,
}

// =============================================================================
// Catalog and user records
// =============================================================================

/// A movie in the display catalog.
///
/// Field names follow the JSON store (`releaseYear` is camel-cased there).
/// `genres`, `moods` and `poster_path` may be absent and default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    #[serde(rename = "releaseYear")]
    pub release_year: i32,
    pub duration: String,
    pub rating: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub poster_path: String,
}

impl CatalogItem {
    /// Lower-cased genre names
    pub fn genres_lower(&self) -> impl Iterator<Item = String> + '_ {
        self.genres.iter().map(|g| g.to_lowercase())
    }

    /// Case-insensitive genre membership
    pub fn has_genre(&self, genre: &str) -> bool {
        let genre = genre.to_lowercase();
        self.genres_lower().any(|g| g == genre)
    }

    /// Case-insensitive mood membership
    pub fn has_mood(&self, mood: &str) -> bool {
        let mood = mood.to_lowercase();
        self.moods.iter().any(|m| m.to_lowercase() == mood)
    }
}

/// A registered user and their favorite catalog items.
///
/// The store also holds credentials; those are not read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub favorites: Vec<ItemId>,
}
