//! Candidate and context types shared by the sources and the pipeline.

use data_loader::{CatalogItem, ItemId};
use std::collections::HashSet;

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Any catalog item, before genre/mood filtering
    Catalog,
    /// Best-rated items used to top up a short list
    TopRated,
}

/// A catalog item under consideration for a recommendation list
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub item: CatalogItem,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(item: CatalogItem, source: CandidateSource) -> Self {
        Self { item, source }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }
}

/// What we know about a user's taste from their favorites
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesContext {
    /// Favorited item ids, found in the catalog or not
    pub favorites: HashSet<ItemId>,
    /// Lower-cased genres of the favorited items that are in the catalog
    pub affinity_genres: HashSet<String>,
}

impl FavoritesContext {
    pub fn new(favorites: HashSet<ItemId>) -> Self {
        Self {
            favorites,
            affinity_genres: HashSet::new(),
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// True if any of the item's genres is one of the affinity genres
    pub fn shares_genre(&self, item: &CatalogItem) -> bool {
        item.genres_lower().any(|g| self.affinity_genres.contains(&g))
    }
}

/// Why a favorite contributed nothing to the affinity set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInCatalog,
    NoGenres,
}

/// A favorite id that was skipped while building the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFavorite {
    pub id: ItemId,
    pub reason: SkipReason,
}

/// Favorites that could not be used, returned to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesDiagnostics {
    pub skipped: Vec<SkippedFavorite>,
}

impl FavoritesDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of favorites missing from the catalog
    pub fn not_in_catalog(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::NotInCatalog)
            .count()
    }
}
