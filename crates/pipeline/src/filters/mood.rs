//! Filter to keep only movies tagged with a requested mood.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, FavoritesContext};

/// Keeps candidates whose moods contain the requested one, ignoring case.
pub struct MoodFilter {
    mood: String,
}

impl MoodFilter {
    pub fn new(mood: impl Into<String>) -> Self {
        Self { mood: mood.into() }
    }
}

impl Filter for MoodFilter {
    fn name(&self) -> &str {
        "MoodFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &FavoritesContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.item.has_mood(&self.mood))
            .collect();
        Ok(filtered)
    }
}
