//! Read-only access to the display catalog.
//!
//! The recommenders only need two things from a catalog: the full listing
//! in a stable order, and lookup by id. That surface is the [`CatalogStore`]
//! trait, which builds search and genre/mood listings on top of it;
//! [`Catalog`] is the in-memory implementation loaded from the JSON record
//! store.

use crate::parser;
use crate::types::{CatalogItem, ItemId};
use std::collections::HashMap;
use std::path::Path;

/// Read access to a movie catalog
pub trait CatalogStore: Send + Sync {
    /// Every movie, in catalog order
    fn all_movies(&self) -> &[CatalogItem];

    /// Look up a movie by id
    fn get_movie(&self, id: &str) -> Option<&CatalogItem>;

    /// Case-insensitive substring search over title and description
    fn search(&self, query: &str) -> Vec<&CatalogItem> {
        let query = query.to_lowercase();
        self.all_movies()
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&query)
                    || m.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Movies tagged with a genre (case-insensitive)
    fn by_genre(&self, genre: &str) -> Vec<&CatalogItem> {
        self.all_movies().iter().filter(|m| m.has_genre(genre)).collect()
    }

    /// Movies tagged with a mood (case-insensitive)
    fn by_mood(&self, mood: &str) -> Vec<&CatalogItem> {
        self.all_movies().iter().filter(|m| m.has_mood(mood)).collect()
    }
}

/// In-memory catalog with an id index.
///
/// When the listing contains the same id twice, lookup returns the first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<CatalogItem>,
    by_id: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new(movies: Vec<CatalogItem>) -> Self {
        let mut by_id = HashMap::with_capacity(movies.len());
        for (position, movie) in movies.iter().enumerate() {
            by_id.entry(movie.id.clone()).or_insert(position);
        }
        Self { movies, by_id }
    }

    /// Load the catalog from a JSON array; a missing file is an empty catalog
    pub fn load(path: &Path) -> Self {
        Self::new(parser::load_json_records(path))
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

impl CatalogStore for Catalog {
    fn all_movies(&self) -> &[CatalogItem] {
        &self.movies
    }

    fn get_movie(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&position| &self.movies[position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, title: &str, genres: &[&str], moods: &[&str], rating: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            release_year: 2000,
            duration: "120 min".to_string(),
            rating,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            moods: moods.iter().map(|m| m.to_string()).collect(),
            poster_path: String::new(),
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            movie("1", "Arrival", &["Sci-Fi", "Drama"], &["Thoughtful"], 7.9),
            movie("2", "Paddington 2", &["Comedy", "Family"], &["Happy"], 7.8),
            movie("3", "Sicario", &["Crime", "Thriller"], &["Tense"], 7.6),
            movie("1", "Arrival (duplicate)", &["Sci-Fi"], &[], 1.0),
        ])
    }

    #[test]
    fn test_lookup_prefers_first_occurrence() {
        let catalog = sample();
        assert_eq!(catalog.get_movie("1").unwrap().title, "Arrival");
        assert!(catalog.get_movie("99").is_none());
        assert_eq!(catalog.all_movies().len(), 4);
    }

    #[test]
    fn test_search_title_and_description() {
        let catalog = sample();
        let hits = catalog.search("ARRIVAL");
        assert_eq!(hits.len(), 2);
        let hits = catalog.search("paddington 2 desc");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
    }

    #[test]
    fn test_genre_and_mood_listing() {
        let catalog = sample();
        assert_eq!(catalog.by_genre("sci-fi").len(), 2);
        assert_eq!(catalog.by_mood("TENSE")[0].title, "Sicario");
        assert!(catalog.by_mood("sad").is_empty());
    }
}
