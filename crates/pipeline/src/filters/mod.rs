//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_favorited;
pub mod genre_affinity;
pub mod mood;

// Re-export for convenience
pub use already_favorited::AlreadyFavoritedFilter;
pub use genre_affinity::GenreAffinityFilter;
pub use mood::MoodFilter;

#[cfg(test)]
pub(crate) fn test_candidate(id: &str, genres: &[&str], moods: &[&str]) -> sources::Candidate {
    sources::Candidate::new(
        data_loader::CatalogItem {
            id: id.to_string(),
            title: format!("Movie {}", id),
            description: String::new(),
            release_year: 2000,
            duration: "100".to_string(),
            rating: 7.0,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            moods: moods.iter().map(|m| m.to_string()).collect(),
            poster_path: String::new(),
        },
        sources::CandidateSource::Catalog,
    )
}
