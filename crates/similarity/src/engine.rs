//! The retrainable similarity engine.
//!
//! A [`SimilarityModel`] is one immutable training result: the index, the
//! resolver configured for it, the metadata rows it was built from and the
//! build report. The
//! [`SimilarityEngine`] owns the current model and hands out `Arc`
//! snapshots, so a query always runs against one complete model even when
//! a retrain swaps in a new one halfway through.

use crate::config::ModelConfig;
use crate::error::{Result, SimilarityError};
use crate::fuzzy::{TitleMatch, TitleResolver};
use crate::index::{build_index, Neighbor, SimilarityIndex};
use crate::matrix::BuildReport;
use data_loader::{CatalogItem, MetadataIndex, RawMovieRecord, RawRating};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// A resolved query and its neighbors
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarTitles {
    pub matched: TitleMatch,
    /// Nearest first; the matched title itself is the first entry
    pub neighbors: Vec<Neighbor>,
}

/// One trained, immutable model
#[derive(Debug)]
pub struct SimilarityModel {
    index: SimilarityIndex,
    resolver: TitleResolver,
    metadata: MetadataIndex,
    report: BuildReport,
}

impl SimilarityModel {
    /// Run the full build + fit pipeline
    pub fn train(
        catalog: &[RawMovieRecord],
        ratings: &[RawRating],
        config: &ModelConfig,
    ) -> Result<Self> {
        let (index, report) = build_index(catalog, ratings, config)?;
        Ok(Self {
            index,
            resolver: TitleResolver::new(config.scorer, config.confidence_threshold),
            metadata: MetadataIndex::new(catalog),
            report,
        })
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Metadata rows from the same training run as the index
    pub fn metadata(&self) -> &MetadataIndex {
        &self.metadata
    }

    /// Catalog items for neighbors that have a metadata row, in order
    pub fn hydrate(&self, neighbors: &[Neighbor]) -> Vec<CatalogItem> {
        neighbors
            .iter()
            .filter_map(|n| self.metadata.hydrate(&n.title))
            .collect()
    }

    /// Resolve a free-text query against the indexed titles
    pub fn resolve(&self, query: &str) -> Result<TitleMatch> {
        let titles = self.index.matrix().titles().iter().map(String::as_str);
        self.resolver.resolve(query, titles)
    }

    /// Resolve `query`, then fetch the `k` nearest titles to the match
    pub fn similar_to(&self, query: &str, k: usize) -> Result<SimilarTitles> {
        let matched = self.resolve(query)?;
        let neighbors = self.index.neighbors(&matched.title, k)?;
        Ok(SimilarTitles { matched, neighbors })
    }
}

/// Owner of the current model
#[derive(Debug)]
pub struct SimilarityEngine {
    config: ModelConfig,
    current: RwLock<Option<Arc<SimilarityModel>>>,
}

impl SimilarityEngine {
    /// An engine with no model; every query fails until a train succeeds
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            current: RwLock::new(None),
        }
    }

    /// Build an engine and train its first model
    pub fn train(
        config: ModelConfig,
        catalog: &[RawMovieRecord],
        ratings: &[RawRating],
    ) -> Result<Self> {
        let engine = Self::new(config);
        engine.retrain(catalog, ratings)?;
        Ok(engine)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Build a new model and swap it in.
    ///
    /// The model is built without holding the lock. If the build fails the
    /// previous model, if any, stays in service.
    #[instrument(skip_all, fields(catalog = catalog.len(), ratings = ratings.len()))]
    pub fn retrain(&self, catalog: &[RawMovieRecord], ratings: &[RawRating]) -> Result<BuildReport> {
        let start = Instant::now();
        let model = match SimilarityModel::train(catalog, ratings, &self.config) {
            Ok(model) => model,
            Err(e) => {
                warn!("Training failed, keeping the current model: {}", e);
                return Err(e);
            }
        };
        let report = model.report;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(model));

        info!(
            "Similarity model ready: {} titles x {} users in {:.2?}",
            report.titles,
            report.users,
            start.elapsed()
        );
        Ok(report)
    }

    /// The model in service right now
    pub fn snapshot(&self) -> Result<Arc<SimilarityModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SimilarityError::ModelUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Resolve `query` and return its neighbors.
    ///
    /// `k` defaults to the configured neighbor count.
    pub fn similar_to(&self, query: &str, k: Option<usize>) -> Result<SimilarTitles> {
        let k = k.unwrap_or(self.config.neighbors);
        self.snapshot()?.similar_to(query, k)
    }

    /// Neighbors of an exact title
    pub fn neighbors(&self, title: &str, k: usize) -> Result<Vec<Neighbor>> {
        self.snapshot()?.index().neighbors(title, k)
    }
}
