//! Filter to keep only movies sharing a genre with the user's favorites.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, FavoritesContext};

/// Keeps candidates with at least one genre in the context's affinity set.
///
/// Genres compare case-insensitively. An empty affinity set keeps nothing.
pub struct GenreAffinityFilter;

impl Filter for GenreAffinityFilter {
    fn name(&self) -> &str {
        "GenreAffinityFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FavoritesContext,
    ) -> Result<Vec<Candidate>> {
        if context.affinity_genres.is_empty() {
            return Ok(Vec::new());
        }
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| context.shares_genre(&candidate.item))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_candidate;

    #[test]
    fn test_genre_affinity_filter() {
        let mut context = FavoritesContext::default();
        context.affinity_genres.insert("action".to_string());
        context.affinity_genres.insert("drama".to_string());

        let candidates = vec![
            test_candidate("1", &["Action", "Adventure"], &[]), // should match
            test_candidate("2", &["DRAMA"], &[]),               // should match
            test_candidate("3", &["Sci-Fi"], &[]),              // should NOT match
            test_candidate("4", &[], &[]),                      // should NOT match
        ];

        let filtered = GenreAffinityFilter.apply(candidates, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().any(|c| c.id() == "1"));
        assert!(filtered.iter().any(|c| c.id() == "2"));
    }

    #[test]
    fn test_empty_affinity_keeps_nothing() {
        let candidates = vec![test_candidate("1", &["Action"], &[])];
        let filtered = GenreAffinityFilter
            .apply(candidates, &FavoritesContext::default())
            .unwrap();
        assert!(filtered.is_empty());
    }
}
