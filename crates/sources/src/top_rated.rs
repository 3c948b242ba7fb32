//! Top-Rated Source - the best-rated catalog items.
//!
//! Used on its own for users we know nothing about, and as the fallback
//! that tops up a favorites list that came out too short.
//!
//! ## Algorithm
//! 1. Keep the first catalog entry per id
//! 2. Stable-sort by descending rating, so equal ratings keep catalog order
//! 3. Skip excluded ids
//! 4. Stop at `limit`

use crate::types::{Candidate, CandidateSource};
use data_loader::{CatalogItem, ItemId};
use std::collections::HashSet;
use tracing::{debug, instrument};

pub struct TopRatedSource<'a> {
    catalog: &'a [CatalogItem],
}

impl<'a> TopRatedSource<'a> {
    pub fn new(catalog: &'a [CatalogItem]) -> Self {
        Self { catalog }
    }

    /// Up to `limit` items by descending rating, skipping `exclude`
    #[instrument(skip(self, exclude), fields(excluded = exclude.len()))]
    pub fn get_candidates(&self, exclude: &HashSet<ItemId>, limit: usize) -> Vec<Candidate> {
        if limit == 0 {
            return Vec::new();
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut ranked: Vec<&CatalogItem> = self
            .catalog
            .iter()
            .filter(|item| seen.insert(item.id.as_str()))
            .collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let candidates: Vec<Candidate> = ranked
            .into_iter()
            .filter(|item| !exclude.contains(&item.id))
            .take(limit)
            .map(|item| Candidate::new(item.clone(), CandidateSource::TopRated))
            .collect();

        debug!("Generated {} top-rated candidates", candidates.len());
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, rating: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Movie {}", id),
            description: String::new(),
            release_year: 2000,
            duration: "100".to_string(),
            rating,
            genres: Vec::new(),
            moods: Vec::new(),
            poster_path: String::new(),
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_descending_rating_with_stable_ties() {
        let catalog = vec![movie("a", 7.0), movie("b", 9.0), movie("c", 7.0), movie("d", 8.0)];
        let candidates = TopRatedSource::new(&catalog).get_candidates(&HashSet::new(), 10);
        assert_eq!(ids(&candidates), vec!["b", "d", "a", "c"]);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::TopRated));
    }

    #[test]
    fn test_exclusions_and_limit() {
        let catalog = vec![movie("a", 7.0), movie("b", 9.0), movie("c", 6.0), movie("d", 8.0)];
        let exclude: HashSet<ItemId> = ["b".to_string()].into_iter().collect();
        let candidates = TopRatedSource::new(&catalog).get_candidates(&exclude, 2);
        assert_eq!(ids(&candidates), vec!["d", "a"]);

        assert!(TopRatedSource::new(&catalog).get_candidates(&exclude, 0).is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first_entry() {
        let catalog = vec![movie("a", 2.0), movie("b", 5.0), movie("a", 9.5)];
        let candidates = TopRatedSource::new(&catalog).get_candidates(&HashSet::new(), 10);
        // The later, higher-rated copy of "a" is ignored
        assert_eq!(ids(&candidates), vec!["b", "a"]);
        assert_eq!(candidates[1].item.rating, 2.0);
    }
}
