//! Exact k-nearest-neighbor search over the rating matrix.
//!
//! Every query scans all rows: the catalog is a fixed, moderate size and an
//! exact answer matters more than latency. Distances are computed in
//! parallel, then ranked by `(distance, row)` so ties resolve to row order.
//!
//! Nothing is excluded from the ranking. Querying with a row's own vector
//! returns that row first, at distance zero.

use crate::config::{DistanceMetric, ModelConfig};
use crate::error::{Result, SimilarityError};
use crate::matrix::{BuildReport, QualityGate, RatingMatrix};
use data_loader::{RawMovieRecord, RawRating};
use rayon::prelude::*;
use sprs::CsVecView;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// A ranked row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHit {
    pub row: usize,
    pub distance: f64,
}

/// A ranked title
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub title: String,
    pub distance: f64,
}

/// Brute-force nearest-neighbor index
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    matrix: RatingMatrix,
    metric: DistanceMetric,
    /// Euclidean norm of every row, computed at fit time
    norms: Vec<f64>,
}

impl SimilarityIndex {
    /// Fit the index over a matrix
    pub fn fit(matrix: RatingMatrix, metric: DistanceMetric) -> Self {
        let norms = (0..matrix.rows())
            .into_par_iter()
            .map(|row| {
                matrix
                    .row(row)
                    .map(|v| v.iter().map(|(_, &x)| x * x).sum::<f64>().sqrt())
                    .unwrap_or(0.0)
            })
            .collect();
        Self {
            matrix,
            metric,
            norms,
        }
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// The `k` rows closest to `vector`, nearest first.
    ///
    /// `k` larger than the number of rows returns every row.
    #[instrument(skip(self, vector), fields(metric = %self.metric))]
    pub fn query(&self, vector: CsVecView<'_, f64>, k: usize) -> Result<Vec<RowHit>> {
        if self.is_empty() {
            return Err(SimilarityError::ModelUnavailable);
        }
        if vector.dim() != self.matrix.cols() {
            return Err(SimilarityError::DimensionMismatch {
                expected: self.matrix.cols(),
                found: vector.dim(),
            });
        }

        let query_norm = vector.iter().map(|(_, &x)| x * x).sum::<f64>().sqrt();

        let mut hits: Vec<RowHit> = (0..self.matrix.rows())
            .into_par_iter()
            .map(|row| RowHit {
                row,
                distance: self.distance_to_row(&vector, query_norm, row),
            })
            .collect();

        let k = k.min(hits.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, rank);
            hits.truncate(k);
        }
        hits.sort_unstable_by(rank);

        debug!("Query returned {} rows", hits.len());
        Ok(hits)
    }

    /// The `k` titles closest to `title`, the title itself included
    pub fn neighbors(&self, title: &str, k: usize) -> Result<Vec<Neighbor>> {
        if self.is_empty() {
            return Err(SimilarityError::ModelUnavailable);
        }
        let row = self
            .matrix
            .row_of(title)
            .ok_or_else(|| SimilarityError::UnknownTitle(title.to_string()))?;
        let vector = self
            .matrix
            .row(row)
            .ok_or(SimilarityError::ModelUnavailable)?;

        let hits = self.query(vector, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                Some(Neighbor {
                    title: self.matrix.title(hit.row)?.to_string(),
                    distance: hit.distance,
                })
            })
            .collect())
    }

    fn distance_to_row(&self, vector: &CsVecView<'_, f64>, query_norm: f64, row: usize) -> f64 {
        let Some(other) = self.matrix.row(row) else {
            return f64::INFINITY;
        };
        match self.metric {
            DistanceMetric::Euclidean => squared_difference(vector, &other).sqrt(),
            DistanceMetric::Cosine => {
                let denominator = query_norm * self.norms[row];
                if denominator == 0.0 {
                    1.0
                } else {
                    1.0 - dot(vector, &other) / denominator
                }
            }
        }
    }
}

/// Ascending distance, then ascending row
fn rank(a: &RowHit, b: &RowHit) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.row.cmp(&b.row))
}

/// Walk two sparse vectors in index order, calling `f` with the pair of
/// values at every index stored in either of them
fn merge_with(a: &CsVecView<'_, f64>, b: &CsVecView<'_, f64>, mut f: impl FnMut(f64, f64)) {
    let mut left = a.iter().peekable();
    let mut right = b.iter().peekable();
    loop {
        match (left.peek(), right.peek()) {
            (Some(&(i, &x)), Some(&(j, &y))) => match i.cmp(&j) {
                Ordering::Less => {
                    f(x, 0.0);
                    left.next();
                }
                Ordering::Greater => {
                    f(0.0, y);
                    right.next();
                }
                Ordering::Equal => {
                    f(x, y);
                    left.next();
                    right.next();
                }
            },
            (Some(&(_, &x)), None) => {
                f(x, 0.0);
                left.next();
            }
            (None, Some(&(_, &y))) => {
                f(0.0, y);
                right.next();
            }
            (None, None) => break,
        }
    }
}

fn squared_difference(a: &CsVecView<'_, f64>, b: &CsVecView<'_, f64>) -> f64 {
    let mut total = 0.0;
    merge_with(a, b, |x, y| total += (x - y) * (x - y));
    total
}

fn dot(a: &CsVecView<'_, f64>, b: &CsVecView<'_, f64>) -> f64 {
    let mut total = 0.0;
    merge_with(a, b, |x, y| total += x * y);
    total
}

/// Build the rating matrix and fit an index over it.
///
/// Fails with [`SimilarityError::EmptyModel`] when no rating survives the
/// join; there is nothing to fit.
pub fn build_index(
    catalog: &[RawMovieRecord],
    ratings: &[RawRating],
    config: &ModelConfig,
) -> Result<(SimilarityIndex, BuildReport)> {
    let gate = QualityGate::new(config.reference_language.clone(), config.min_vote_count);
    let (matrix, report) = RatingMatrix::build(catalog, ratings, &gate);
    if matrix.is_empty() {
        return Err(SimilarityError::EmptyModel);
    }
    Ok((SimilarityIndex::fit(matrix, config.metric), report))
}
