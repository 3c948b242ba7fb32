//! Favorites-based recommendations.
//!
//! ## Algorithm
//! 1. Unknown user: the top `target_count` items by rating, unshuffled
//! 2. Build the favorites context (affinity genres + diagnostics)
//! 3. Run every distinct catalog item through the filter pipeline:
//!    not favorited, shares an affinity genre, has the mood (if given)
//! 4. Fewer than `fallback_trigger` survivors: top up with top-rated
//!    items until the list holds `target_count`
//! 5. Shuffle, then cut to `max_count`
//!
//! Never fails. A pipeline error degrades to the top-rated list.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AlreadyFavoritedFilter, GenreAffinityFilter, MoodFilter};
use data_loader::{CatalogItem, ItemId};
use rand::Rng;
use rand::seq::SliceRandom;
use sources::{
    build_favorites_context, Candidate, CatalogSource, FavoritesDiagnostics, TopRatedSource,
};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Sizes of the recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendOptions {
    /// Length of the unknown-user list, and of a topped-up list
    pub target_count: usize,
    /// Hard cap on the returned list
    pub max_count: usize,
    /// Top up with top-rated items when fewer candidates than this survive
    pub fallback_trigger: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            target_count: 10,
            max_count: 20,
            fallback_trigger: 5,
        }
    }
}

impl RecommendOptions {
    /// Configure the target list length (default: 10)
    pub fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = count;
        self
    }

    /// Configure the maximum list length (default: 20)
    pub fn with_max_count(mut self, count: usize) -> Self {
        self.max_count = count;
        self
    }

    /// Configure when the top-rated fallback kicks in (default: 5)
    pub fn with_fallback_trigger(mut self, count: usize) -> Self {
        self.fallback_trigger = count;
        self
    }
}

/// Recommend catalog items for a user.
///
/// `favorites` is `None` for an unknown user. The returned diagnostics list
/// the favorites that could not be used.
#[instrument(skip_all, fields(
    favorites = favorites.map(|f| f.len()),
    catalog = catalog.len(),
    mood = mood
))]
pub fn recommend_for_user<R: Rng + ?Sized>(
    favorites: Option<&HashSet<ItemId>>,
    catalog: &[CatalogItem],
    mood: Option<&str>,
    options: &RecommendOptions,
    rng: &mut R,
) -> (Vec<CatalogItem>, FavoritesDiagnostics) {
    let top_rated = TopRatedSource::new(catalog);

    let Some(favorites) = favorites else {
        let limit = options.target_count.min(options.max_count);
        let items = into_items(top_rated.get_candidates(&HashSet::new(), limit));
        debug!("Unknown user, returning {} top-rated items", items.len());
        return (items, FavoritesDiagnostics::default());
    };

    let (context, diagnostics) = build_favorites_context(favorites, catalog);

    let mut pipeline = FilterPipeline::new()
        .add_filter(AlreadyFavoritedFilter)
        .add_filter(GenreAffinityFilter);
    if let Some(mood) = mood {
        pipeline = pipeline.add_filter(MoodFilter::new(mood));
    }

    let mut selected = match pipeline.apply(CatalogSource::new(catalog).get_candidates(), &context) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Filter pipeline failed, using top-rated items only: {:#}", e);
            Vec::new()
        }
    };
    debug!("{} candidates after filtering", selected.len());

    if selected.len() < options.fallback_trigger {
        let mut exclude = context.favorites.clone();
        exclude.extend(selected.iter().map(|c| c.item.id.clone()));
        let needed = options.target_count.saturating_sub(selected.len());
        let fallback = top_rated.get_candidates(&exclude, needed);
        debug!("Topping up with {} top-rated items", fallback.len());
        selected.extend(fallback);
    }

    selected.shuffle(rng);
    selected.truncate(options.max_count);

    (into_items(selected), diagnostics)
}

fn into_items(candidates: Vec<Candidate>) -> Vec<CatalogItem> {
    candidates.into_iter().map(|c| c.item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn movie(id: &str, genres: &[&str], moods: &[&str], rating: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Movie {}", id),
            description: String::new(),
            release_year: 2000,
            duration: "100".to_string(),
            rating,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            moods: moods.iter().map(|m| m.to_string()).collect(),
            poster_path: String::new(),
        }
    }

    fn favorites(ids: &[&str]) -> HashSet<ItemId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn ids(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|m| m.id.as_str()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_unknown_user_gets_top_rated_in_order() {
        let catalog: Vec<CatalogItem> = (0..15)
            .map(|i| movie(&i.to_string(), &["Drama"], &[], i as f64))
            .collect();
        let (items, diagnostics) =
            recommend_for_user(None, &catalog, None, &RecommendOptions::default(), &mut rng());

        assert_eq!(items.len(), 10);
        assert_eq!(ids(&items)[..3], ["14", "13", "12"]);
        assert!(items.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_small_catalog_falls_back() {
        // A(Drama, 9), B(Drama, 7), C(Comedy, 8); favorites {A}
        let catalog = vec![
            movie("A", &["Drama"], &[], 9.0),
            movie("B", &["Drama"], &[], 7.0),
            movie("C", &["Comedy"], &[], 8.0),
        ];
        let (items, _) = recommend_for_user(
            Some(&favorites(&["A"])),
            &catalog,
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );

        let mut got = ids(&items);
        got.sort();
        assert_eq!(got, vec!["B", "C"]);
    }

    #[test]
    fn test_enough_candidates_skip_fallback() {
        let mut catalog: Vec<CatalogItem> = (0..6)
            .map(|i| movie(&format!("d{}", i), &["Drama"], &[], 5.0))
            .collect();
        catalog.push(movie("fav", &["Drama"], &[], 9.0));
        catalog.push(movie("top", &["Comedy"], &[], 10.0));

        let (items, _) = recommend_for_user(
            Some(&favorites(&["fav"])),
            &catalog,
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );

        assert_eq!(items.len(), 6);
        assert!(!ids(&items).contains(&"top"));
        assert!(!ids(&items).contains(&"fav"));
    }

    #[test]
    fn test_mood_narrows_candidates_but_not_fallback() {
        let catalog = vec![
            movie("fav", &["Drama"], &[], 9.0),
            movie("happy", &["Drama"], &["Happy"], 6.0),
            movie("sad", &["Drama"], &["Sad"], 7.0),
            movie("other", &["Comedy"], &[], 8.0),
        ];
        let options = RecommendOptions::default().with_target_count(2);
        let (items, _) = recommend_for_user(
            Some(&favorites(&["fav"])),
            &catalog,
            Some("HAPPY"),
            &options,
            &mut rng(),
        );

        let mut got = ids(&items);
        got.sort();
        // One mood match, then the best-rated remaining item
        assert_eq!(got, vec!["happy", "other"]);
    }

    #[test]
    fn test_output_is_capped() {
        let catalog: Vec<CatalogItem> = (0..50)
            .map(|i| movie(&i.to_string(), &["Drama"], &[], 5.0))
            .collect();
        let (items, _) = recommend_for_user(
            Some(&favorites(&["0"])),
            &catalog,
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );
        assert_eq!(items.len(), 20);

        let options = RecommendOptions::default().with_max_count(3);
        let (items, _) = recommend_for_user(None, &catalog, None, &options, &mut rng());
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_duplicate_catalog_ids_collapse() {
        let catalog = vec![
            movie("fav", &["Drama"], &[], 9.0),
            movie("x", &["Drama"], &[], 6.0),
            movie("x", &["Drama"], &[], 6.0),
            movie("y", &["Comedy"], &[], 8.0),
            movie("y", &["Comedy"], &[], 8.0),
        ];
        let (items, _) = recommend_for_user(
            Some(&favorites(&["fav"])),
            &catalog,
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );
        let mut got = ids(&items);
        got.sort();
        assert_eq!(got, vec!["x", "y"]);
    }

    #[test]
    fn test_unknown_favorites_are_reported() {
        let catalog = vec![movie("a", &["Drama"], &[], 9.0), movie("b", &["Drama"], &[], 7.0)];
        let (items, diagnostics) = recommend_for_user(
            Some(&favorites(&["a", "ghost"])),
            &catalog,
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );
        assert_eq!(ids(&items), vec!["b"]);
        assert_eq!(diagnostics.not_in_catalog(), 1);
        assert_eq!(diagnostics.skipped[0].id, "ghost");
    }

    #[test]
    fn test_same_seed_same_order() {
        let catalog: Vec<CatalogItem> = (0..30)
            .map(|i| movie(&i.to_string(), &["Drama"], &[], 5.0))
            .collect();
        let favs = favorites(&["0"]);
        let options = RecommendOptions::default();

        let (first, _) = recommend_for_user(Some(&favs), &catalog, None, &options, &mut rng());
        let (second, _) = recommend_for_user(Some(&favs), &catalog, None, &options, &mut rng());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_catalog() {
        let (items, diagnostics) = recommend_for_user(
            Some(&favorites(&["a"])),
            &[],
            None,
            &RecommendOptions::default(),
            &mut rng(),
        );
        assert!(items.is_empty());
        assert_eq!(diagnostics.not_in_catalog(), 1);
    }
}
