//! Build a FavoritesContext from a user's favorite ids and the catalog.

use crate::types::{FavoritesContext, FavoritesDiagnostics, SkipReason, SkippedFavorite};
use data_loader::{CatalogItem, ItemId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Derive the affinity genres of a set of favorites.
///
/// The affinity set is the union of the lower-cased genres of every favorite
/// found in the catalog. Favorites that are not in the catalog, or that have
/// no genres, are reported in the diagnostics (sorted by id).
pub fn build_favorites_context(
    favorites: &HashSet<ItemId>,
    catalog: &[CatalogItem],
) -> (FavoritesContext, FavoritesDiagnostics) {
    let mut by_id: HashMap<&str, &CatalogItem> = HashMap::with_capacity(catalog.len());
    for item in catalog {
        by_id.entry(item.id.as_str()).or_insert(item);
    }

    let mut context = FavoritesContext::new(favorites.clone());
    let mut diagnostics = FavoritesDiagnostics::default();

    for id in favorites {
        match by_id.get(id.as_str()) {
            Some(item) if item.genres.is_empty() => diagnostics.skipped.push(SkippedFavorite {
                id: id.clone(),
                reason: SkipReason::NoGenres,
            }),
            Some(item) => context.affinity_genres.extend(item.genres_lower()),
            None => diagnostics.skipped.push(SkippedFavorite {
                id: id.clone(),
                reason: SkipReason::NotInCatalog,
            }),
        }
    }
    diagnostics.skipped.sort_by(|a, b| a.id.cmp(&b.id));

    if !diagnostics.is_empty() {
        debug!(
            "Skipped {} of {} favorites: {:?}",
            diagnostics.skipped.len(),
            favorites.len(),
            diagnostics.skipped
        );
    }
    debug!("Affinity genres: {:?}", context.affinity_genres);

    (context, diagnostics)
}
