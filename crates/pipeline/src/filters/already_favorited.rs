//! Filter to remove movies the user has already favorited.
//!
//! This is the first filter in the pipeline; a favorite is never
//! recommended back to the user.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, FavoritesContext};

/// Removes candidates that are in the user's favorites.
pub struct AlreadyFavoritedFilter;

impl Filter for AlreadyFavoritedFilter {
    fn name(&self) -> &str {
        "AlreadyFavoritedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &FavoritesContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.is_favorite(candidate.id()))
            .collect();
        Ok(filtered)
    }
}
