//! # Recommendation Service
//!
//! Coordinates the two recommenders behind one injectable value:
//! 1. Similar movies: resolve a free-text title, rank its neighbors in the
//!    rating matrix, hydrate them from the movie metadata of the same model
//! 2. Favorites: look the user up, run the favorites recommender over the
//!    catalog
//! 3. Retrain: rebuild the similarity model from fresh tables and swap it in
//!
//! Each similarity query works on one model snapshot, so the titles it
//! ranks and the metadata it hydrates them from always belong together.
//!
//! The recommenders are synchronous and CPU-bound, so every entry point
//! runs them on `tokio::task::spawn_blocking`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use data_loader::{
    CatalogItem, CatalogStore, DataPaths, DataSet, FavoritesStore, RawMovieRecord, RawRating,
};
use pipeline::{recommend_for_user, RecommendOptions};
use similarity::{BuildReport, ErrorKind, ModelConfig, SimilarityEngine, SimilarityError, TitleMatch};
use sources::FavoritesDiagnostics;

/// Movies similar to a query
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMovies {
    /// The indexed title the query resolved to
    pub matched: TitleMatch,
    /// Neighbors with a metadata row, nearest first
    pub movies: Vec<CatalogItem>,
}

/// A user's recommendation list
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub movies: Vec<CatalogItem>,
    /// Favorites that could not be used
    pub diagnostics: FavoritesDiagnostics,
}

/// Classify a service error for the caller.
///
/// `None` means the failure did not come from the similarity model.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|e| e.downcast_ref::<SimilarityError>())
        .map(SimilarityError::kind)
}

/// Main service that owns the model and the record stores
#[derive(Clone)]
pub struct RecommendationService {
    engine: Arc<SimilarityEngine>,
    catalog: Arc<dyn CatalogStore>,
    favorites: Arc<dyn FavoritesStore>,
    options: RecommendOptions,
}

impl RecommendationService {
    /// Assemble a service from its parts
    pub fn new(
        engine: Arc<SimilarityEngine>,
        catalog: Arc<dyn CatalogStore>,
        favorites: Arc<dyn FavoritesStore>,
    ) -> Self {
        Self {
            engine,
            catalog,
            favorites,
            options: RecommendOptions::default(),
        }
    }

    /// Configure recommendation list sizes (default: 10 / 20 / 5)
    pub fn with_options(mut self, options: RecommendOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a service from loaded data, training the first model.
    ///
    /// A model that can't be built is logged, not fatal: the service comes
    /// up and similarity queries fail as unavailable until a retrain works.
    pub fn from_dataset(data: DataSet, config: ModelConfig) -> Self {
        let engine = SimilarityEngine::new(config);
        if let Err(e) = engine.retrain(&data.tables.movies, &data.tables.ratings) {
            warn!("Starting without a similarity model: {}", e);
        }

        Self::new(
            Arc::new(engine),
            Arc::new(data.catalog),
            Arc::new(data.users),
        )
    }

    /// Load a data directory and build a service from it
    pub async fn load(paths: DataPaths, config: ModelConfig) -> Result<Self> {
        let start = Instant::now();
        let service = tokio::task::spawn_blocking(move || -> Result<Self> {
            let data = DataSet::load(&paths)
                .with_context(|| format!("Failed to load data from {:?}", paths))?;
            Ok(Self::from_dataset(data, config))
        })
        .await
        .context("Loading task panicked")??;

        info!("Service ready in {:.2?}", start.elapsed());
        Ok(service)
    }

    pub fn engine(&self) -> &Arc<SimilarityEngine> {
        &self.engine
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// Single catalog movie by id
    pub fn movie(&self, id: &str) -> Option<CatalogItem> {
        self.catalog.get_movie(id).cloned()
    }

    /// Movies similar to a free-text title query.
    ///
    /// Fails with a [`SimilarityError`] in the chain when there is no model
    /// or the query resolves to nothing; see [`error_kind`].
    #[instrument(skip(self))]
    pub async fn similar_movies(&self, query: &str) -> Result<SimilarMovies> {
        let start = Instant::now();
        let engine = self.engine.clone();
        let query = query.to_string();

        let similar = tokio::task::spawn_blocking(move || {
            let model = engine.snapshot()?;
            let similar = model.similar_to(&query, engine.config().neighbors)?;
            let movies = model.hydrate(&similar.neighbors);
            Ok::<_, SimilarityError>(SimilarMovies {
                matched: similar.matched,
                movies,
            })
        })
        .await
        .context("Similarity task panicked")?
        .context("Failed to find similar movies")?;

        info!(
            "Found {} movies similar to '{}' in {:.2?}",
            similar.movies.len(),
            similar.matched.title,
            start.elapsed()
        );
        Ok(similar)
    }

    /// Recommendations from a user's favorites.
    ///
    /// Unknown users get the top-rated list; this only fails if the
    /// worker task does.
    #[instrument(skip(self))]
    pub async fn recommended_for_user(
        &self,
        user_id: &str,
        mood: Option<&str>,
    ) -> Result<Recommendations> {
        let start = Instant::now();
        let favorites = self.favorites.favorites(user_id);
        if favorites.is_none() {
            info!("User {} not found, using top-rated movies", user_id);
        }

        let catalog = self.catalog.clone();
        let mood = mood.map(str::to_string);
        let options = self.options;

        let (movies, diagnostics) = tokio::task::spawn_blocking(move || {
            let mut rng = rand::rng();
            recommend_for_user(
                favorites.as_ref(),
                catalog.all_movies(),
                mood.as_deref(),
                &options,
                &mut rng,
            )
        })
        .await
        .context("Recommendation task panicked")?;

        info!(
            "Recommended {} movies for user {} in {:.2?}",
            movies.len(),
            user_id,
            start.elapsed()
        );
        Ok(Recommendations {
            movies,
            diagnostics,
        })
    }

    /// Rebuild the similarity model from new tables.
    ///
    /// The new model carries its own metadata and replaces the old one in a
    /// single swap. On failure the current model stays in service.
    pub async fn retrain(
        &self,
        catalog_rows: Vec<RawMovieRecord>,
        ratings: Vec<RawRating>,
    ) -> Result<BuildReport> {
        let engine = self.engine.clone();

        let report = tokio::task::spawn_blocking(move || engine.retrain(&catalog_rows, &ratings))
            .await
            .context("Retrain task panicked")?
            .context("Failed to retrain similarity model")?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, User, UserDirectory};
    use std::collections::HashSet;

    // ============================================================================
    // Test Helpers
    // ============================================================================

    fn metadata_rows() -> Vec<RawMovieRecord> {
        let mut matrix = RawMovieRecord::new("603", "The Matrix", "en", 9000.0);
        matrix.release_date = Some("1999-03-30".to_string());
        matrix.genres = Some("[{'id': 28, 'name': 'Action'}]".to_string());
        matrix.vote_average = Some(7.9);

        let mut reloaded = RawMovieRecord::new("604", "The Matrix Reloaded", "en", 3500.0);
        reloaded.release_date = Some("2003-05-15".to_string());

        vec![
            matrix,
            reloaded,
            RawMovieRecord::new("605", "The Matrix Revolutions", "en", 3000.0),
            RawMovieRecord::new("509", "Notting Hill", "en", 1200.0),
        ]
    }

    fn ratings() -> Vec<RawRating> {
        vec![
            RawRating::new(1, "603", 5.0),
            RawRating::new(1, "604", 4.5),
            RawRating::new(1, "605", 4.0),
            RawRating::new(2, "603", 4.0),
            RawRating::new(2, "604", 4.0),
            RawRating::new(2, "605", 3.5),
            RawRating::new(3, "509", 5.0),
        ]
    }

    fn catalog_item(id: &str, genres: &[&str], moods: &[&str], rating: f64) -> CatalogItem {
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

    fn build_test_service(ratings: &[RawRating]) -> RecommendationService {
        let rows = metadata_rows();
        let engine = SimilarityEngine::new(ModelConfig::default());
        let _ = engine.retrain(&rows, ratings);

        let catalog = Catalog::new(vec![
            catalog_item("a", &["Drama"], &["Calm"], 9.0),
            catalog_item("b", &["Drama"], &["Happy"], 7.0),
            catalog_item("c", &["Comedy"], &["Happy"], 8.0),
        ]);
        let users = UserDirectory::new(vec![User {
            id: "u1".to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            favorites: vec!["a".to_string()],
        }]);

        RecommendationService::new(
            Arc::new(engine),
            Arc::new(catalog),
            Arc::new(users),
        )
    }

    // ============================================================================
    // Similar movies
    // ============================================================================

    #[tokio::test]
    async fn test_similar_movies_hydrates_neighbors() {
        let service = build_test_service(&ratings());
        assert!(service.is_ready());

        let similar = service.similar_movies("matrix reloded").await.unwrap();
        assert_eq!(similar.matched.title, "The Matrix Reloaded");
        assert_eq!(similar.movies.len(), 4);
        assert_eq!(similar.movies[0].id, "604");
        assert_eq!(similar.movies[0].release_year, 2003);
        assert_eq!(similar.movies[3].title, "Notting Hill");

        let matrix = similar.movies.iter().find(|m| m.id == "603").unwrap();
        assert_eq!(matrix.genres, vec!["Action".to_string()]);
        assert_eq!(matrix.rating, 7.9);
    }

    #[tokio::test]
    async fn test_similar_movies_not_found() {
        let service = build_test_service(&ratings());
        let err = service.similar_movies("zzzzz_no_such_movie").await.unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_similar_movies_without_model() {
        let service = build_test_service(&[]);
        assert!(!service.is_ready());

        let err = service.similar_movies("The Matrix").await.unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::BadRequest));
        assert!(matches!(
            err.downcast_ref::<SimilarityError>(),
            Some(SimilarityError::ModelUnavailable)
        ));
    }

    // ============================================================================
    // Recommendations
    // ============================================================================

    #[tokio::test]
    async fn test_recommended_for_user_excludes_favorites() {
        let service = build_test_service(&ratings());
        let recommendations = service.recommended_for_user("u1", None).await.unwrap();

        let ids: HashSet<&str> = recommendations.movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"].into_iter().collect());
        assert!(recommendations.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_gets_top_rated() {
        let service = build_test_service(&ratings());
        let recommendations = service.recommended_for_user("ghost", None).await.unwrap();

        let ids: Vec<&str> = recommendations.movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_options_cap_the_list() {
        let service = build_test_service(&ratings())
            .with_options(RecommendOptions::default().with_max_count(1));
        let recommendations = service.recommended_for_user("u1", Some("happy")).await.unwrap();
        assert_eq!(recommendations.movies.len(), 1);
    }

    #[tokio::test]
    async fn test_movie_lookup() {
        let service = build_test_service(&ratings());
        assert_eq!(service.movie("c").unwrap().rating, 8.0);
        assert!(service.movie("zzz").is_none());
    }

    // ============================================================================
    // Retrain
    // ============================================================================

    #[tokio::test]
    async fn test_retrain_brings_service_up() {
        let service = build_test_service(&[]);
        assert!(!service.is_ready());

        let report = service.retrain(metadata_rows(), ratings()).await.unwrap();
        assert_eq!(report.titles, 4);
        assert!(service.is_ready());
        assert!(service.similar_movies("Notting Hill").await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_retrain_keeps_serving() {
        let service = build_test_service(&ratings());

        let err = service.retrain(metadata_rows(), Vec::new()).await.unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Unavailable));

        let similar = service.similar_movies("The Matrix").await.unwrap();
        assert_eq!(similar.matched.title, "The Matrix");
    }

    /// The base rows plus a title only the second model knows
    fn extended_rows() -> (Vec<RawMovieRecord>, Vec<RawRating>) {
        let mut gamma = RawMovieRecord::new("700", "Gamma Ray", "en", 2000.0);
        gamma.release_date = Some("2010-01-01".to_string());

        let mut rows = metadata_rows();
        rows.push(gamma);
        let mut extended = ratings();
        extended.push(RawRating::new(3, "700", 4.0));
        extended.push(RawRating::new(1, "700", 2.0));
        (rows, extended)
    }

    /// Every hydrated list must come from the model that resolved the query
    fn assert_consistent(result: Result<SimilarMovies>) {
        match result {
            Ok(similar) => {
                if similar.matched.title == "Gamma Ray" {
                    assert_eq!(similar.movies.len(), 5);
                    assert_eq!(similar.movies[0].id, "700");
                } else {
                    assert_eq!(similar.movies.len(), 4);
                }
            }
            Err(e) => assert_eq!(error_kind(&e), Some(ErrorKind::NotFound)),
        }
    }

    #[tokio::test]
    async fn test_retrain_swaps_model_and_metadata_together() {
        let service = build_test_service(&ratings());
        assert_consistent(service.similar_movies("Gamma Ray").await);

        let (rows, extended) = extended_rows();
        service.retrain(rows, extended).await.unwrap();
        let similar = service.similar_movies("Gamma Ray").await.unwrap();
        assert_eq!(similar.matched.title, "Gamma Ray");
        assert_eq!(similar.movies[0].title, "Gamma Ray");
        assert_eq!(similar.movies[0].release_year, 2010);

        service.retrain(metadata_rows(), ratings()).await.unwrap();
        let err = service.similar_movies("Gamma Ray").await.unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_queries_during_retrain() {
        let service = build_test_service(&ratings());

        let mut handles = Vec::new();
        for i in 0..64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                match i % 8 {
                    0 => {
                        let (rows, extended) = extended_rows();
                        service.retrain(rows, extended).await.unwrap();
                    }
                    4 => {
                        service.retrain(metadata_rows(), ratings()).await.unwrap();
                    }
                    _ => assert_consistent(service.similar_movies("Gamma Ray").await),
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
