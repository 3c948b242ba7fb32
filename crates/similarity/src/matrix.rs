//! Rating matrix construction.
//!
//! ## Pipeline
//! 1. Quality-gate the catalog: numeric id, title, language and vote count
//!    present; language equal to the reference language; vote count above
//!    the minimum. The first surviving row wins when ids repeat.
//! 2. Join ratings to the gated catalog by coerced movie id.
//! 3. Drop repeated `(user, movie)` pairs, keeping the first.
//! 4. Pivot to rows = title (ascending), columns = user id (ascending).
//!    Cells that repeat (two movies sharing a title) keep the last rating.
//!    Missing cells are 0, indistinguishable from a rating of 0.
//! 5. Store the pivot as a CSR matrix.

use data_loader::{coerce_movie_id, MovieId, RawMovieRecord, RawRating, RatingEvent, UserId};
use sprs::{CsMat, CsVecView, TriMat};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Catalog admission rule
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGate {
    pub language: String,
    /// Rows need strictly more votes than this
    pub min_vote_count: f64,
}

impl QualityGate {
    pub fn new(language: impl Into<String>, min_vote_count: f64) -> Self {
        Self {
            language: language.into(),
            min_vote_count,
        }
    }

    fn admits(&self, language: &str, vote_count: f64) -> bool {
        language == self.language && vote_count > self.min_vote_count
    }
}

/// What the build kept and what it dropped, and why
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub catalog_rows: usize,
    pub catalog_bad_id: usize,
    pub catalog_missing_fields: usize,
    pub catalog_below_gate: usize,
    pub catalog_duplicate_ids: usize,

    pub ratings: usize,
    pub ratings_bad_id: usize,
    pub ratings_bad_value: usize,
    pub ratings_unmatched: usize,
    pub ratings_duplicate_pairs: usize,

    /// Ratings that survived the join and deduplication
    pub joined: usize,
    pub titles: usize,
    pub users: usize,
}

/// Sparse title × user rating matrix.
///
/// Row order is title order and is fixed for the life of the matrix.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    matrix: CsMat<f64>,
    titles: Vec<String>,
    title_rows: HashMap<String, usize>,
    users: Vec<UserId>,
}

impl RatingMatrix {
    /// A matrix with no rows and no columns
    pub fn empty() -> Self {
        Self::from_events(Vec::new())
    }

    /// Run the full filter + join + pivot pipeline
    #[instrument(skip_all, fields(catalog = catalog.len(), ratings = ratings.len()))]
    pub fn build(
        catalog: &[RawMovieRecord],
        ratings: &[RawRating],
        gate: &QualityGate,
    ) -> (Self, BuildReport) {
        let mut report = BuildReport {
            catalog_rows: catalog.len(),
            ratings: ratings.len(),
            ..BuildReport::default()
        };

        let titles_by_id = gate_catalog(catalog, gate, &mut report);
        let joined = join_ratings(ratings, &titles_by_id, &mut report);
        report.joined = joined.len();

        let matrix = Self::from_events(joined);
        report.titles = matrix.rows();
        report.users = matrix.cols();

        info!(
            "Built rating matrix: {} titles x {} users from {} joined ratings",
            report.titles, report.users, report.joined
        );
        debug!("Rating matrix build report: {:?}", report);
        (matrix, report)
    }

    /// Pivot already-joined `(title, rating)` events
    fn from_events(events: Vec<(&str, RatingEvent)>) -> Self {
        let titles: Vec<String> = events
            .iter()
            .map(|(title, _)| *title)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let users: Vec<UserId> = events
            .iter()
            .map(|(_, e)| e.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let title_rows: HashMap<String, usize> = titles
            .iter()
            .enumerate()
            .map(|(row, title)| (title.clone(), row))
            .collect();
        let user_cols: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(col, &user)| (user, col))
            .collect();

        // Last write wins per cell; triplets would otherwise be summed
        let mut cells: HashMap<(usize, usize), f64> = HashMap::with_capacity(events.len());
        for (title, event) in &events {
            let cell = (title_rows[*title], user_cols[&event.user_id]);
            cells.insert(cell, f64::from(event.rating));
        }

        let mut triplets = TriMat::new((titles.len(), users.len()));
        for ((row, col), rating) in cells {
            if rating != 0.0 {
                triplets.add_triplet(row, col, rating);
            }
        }
        let matrix: CsMat<f64> = triplets.to_csr();

        Self {
            matrix,
            titles,
            title_rows,
            users,
        }
    }

    pub fn rows(&self) -> usize {
        self.titles.len()
    }

    pub fn cols(&self) -> usize {
        self.users.len()
    }

    /// Number of stored (non-zero) ratings
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Titles in row order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// User ids in column order
    pub fn user_ids(&self) -> &[UserId] {
        &self.users
    }

    pub fn title(&self, row: usize) -> Option<&str> {
        self.titles.get(row).map(String::as_str)
    }

    pub fn row_of(&self, title: &str) -> Option<usize> {
        self.title_rows.get(title).copied()
    }

    /// Sparse view of one title's ratings
    pub fn row(&self, row: usize) -> Option<CsVecView<'_, f64>> {
        self.matrix.outer_view(row)
    }

    pub fn matrix(&self) -> &CsMat<f64> {
        &self.matrix
    }
}

/// Apply the quality gate, returning the title of each admitted movie id
fn gate_catalog<'a>(
    catalog: &'a [RawMovieRecord],
    gate: &QualityGate,
    report: &mut BuildReport,
) -> HashMap<MovieId, &'a str> {
    let mut titles_by_id = HashMap::new();

    for record in catalog {
        let Some(id) = coerce_movie_id(&record.id) else {
            report.catalog_bad_id += 1;
            continue;
        };
        let (Some(title), Some(language), Some(vote_count)) =
            (&record.title, &record.language, record.vote_count)
        else {
            report.catalog_missing_fields += 1;
            continue;
        };
        if !gate.admits(language, vote_count) {
            report.catalog_below_gate += 1;
            continue;
        }
        if titles_by_id.contains_key(&id) {
            report.catalog_duplicate_ids += 1;
            continue;
        }
        titles_by_id.insert(id, title.as_str());
    }

    titles_by_id
}

/// Join ratings to titles, dropping unmatched and repeated pairs
fn join_ratings<'a>(
    ratings: &[RawRating],
    titles_by_id: &HashMap<MovieId, &'a str>,
    report: &mut BuildReport,
) -> Vec<(&'a str, RatingEvent)> {
    let mut seen: HashSet<(UserId, MovieId)> = HashSet::new();
    let mut joined = Vec::new();

    for raw in ratings {
        let Some(item_id) = coerce_movie_id(&raw.movie_id) else {
            report.ratings_bad_id += 1;
            continue;
        };
        if !raw.rating.is_finite() {
            report.ratings_bad_value += 1;
            continue;
        }
        let Some(&title) = titles_by_id.get(&item_id) else {
            report.ratings_unmatched += 1;
            continue;
        };
        if !seen.insert((raw.user_id, item_id)) {
            report.ratings_duplicate_pairs += 1;
            continue;
        }
        joined.push((
            title,
            RatingEvent {
                user_id: raw.user_id,
                item_id,
                rating: raw.rating,
            },
        ));
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QualityGate {
        QualityGate::new("en", 999.0)
    }

    fn catalog() -> Vec<RawMovieRecord> {
        vec![
            RawMovieRecord::new("10", "Heat", "en", 2000.0),
            RawMovieRecord::new("20", "Alien", "en", 5000.0),
            RawMovieRecord::new("30", "Amelie", "fr", 5000.0),
            RawMovieRecord::new("40", "Obscure", "en", 999.0),
            RawMovieRecord::new("1997-08-20", "Broken Row", "en", 5000.0),
            RawMovieRecord {
                title: None,
                ..RawMovieRecord::new("50", "", "en", 5000.0)
            },
            RawMovieRecord::new("10", "Heat (second row)", "en", 2000.0),
        ]
    }

    #[test]
    fn test_quality_gate_and_report() {
        let ratings = vec![
            RawRating::new(1, "10", 4.0),
            RawRating::new(1, "20", 3.0),
            RawRating::new(2, "20", 5.0),
            RawRating::new(2, "30", 5.0),  // language gate
            RawRating::new(2, "40", 5.0),  // vote gate (not strictly above)
            RawRating::new(3, "oops", 1.0), // coercion
            RawRating::new(1, "10", 1.0),  // repeated pair
            RawRating::new(3, "99", 2.0),  // no catalog row
        ];
        let (matrix, report) = RatingMatrix::build(&catalog(), &ratings, &gate());

        assert_eq!(matrix.titles(), &["Alien".to_string(), "Heat".to_string()]);
        assert_eq!(matrix.user_ids(), &[1, 2]);
        assert_eq!(matrix.nnz(), 3);

        assert_eq!(report.catalog_rows, 7);
        assert_eq!(report.catalog_bad_id, 1);
        assert_eq!(report.catalog_missing_fields, 1);
        assert_eq!(report.catalog_below_gate, 2);
        assert_eq!(report.catalog_duplicate_ids, 1);
        assert_eq!(report.ratings_bad_id, 1);
        assert_eq!(report.ratings_unmatched, 3);
        assert_eq!(report.ratings_duplicate_pairs, 1);
        assert_eq!(report.joined, 3);
    }

    #[test]
    fn test_first_rating_wins_for_repeated_pair() {
        let ratings = vec![RawRating::new(7, "10", 4.5), RawRating::new(7, "10.0", 1.0)];
        let (matrix, _) = RatingMatrix::build(&catalog(), &ratings, &gate());

        let row = matrix.row(matrix.row_of("Heat").unwrap()).unwrap();
        let cells: Vec<(usize, f64)> = row.iter().map(|(col, &v)| (col, v)).collect();
        assert_eq!(cells, vec![(0, 4.5)]);
    }

    #[test]
    fn test_shared_title_keeps_last_cell() {
        let catalog = vec![
            RawMovieRecord::new("1", "Twin", "en", 2000.0),
            RawMovieRecord::new("2", "Twin", "en", 2000.0),
        ];
        let ratings = vec![RawRating::new(1, "1", 2.0), RawRating::new(1, "2", 5.0)];
        let (matrix, _) = RatingMatrix::build(&catalog, &ratings, &gate());

        assert_eq!(matrix.rows(), 1);
        let row = matrix.row(0).unwrap();
        let cells: Vec<f64> = row.iter().map(|(_, &v)| v).collect();
        assert_eq!(cells, vec![5.0]);
    }

    #[test]
    fn test_empty_join() {
        let ratings = vec![RawRating::new(1, "30", 4.0)];
        let (matrix, report) = RatingMatrix::build(&catalog(), &ratings, &gate());
        assert!(matrix.is_empty());
        assert_eq!(matrix.cols(), 0);
        assert_eq!(report.joined, 0);

        assert!(RatingMatrix::empty().is_empty());
    }

    #[test]
    fn test_title_rows_are_stable() {
        let ratings = vec![
            RawRating::new(1, "20", 3.0),
            RawRating::new(2, "10", 4.0),
        ];
        let (matrix, _) = RatingMatrix::build(&catalog(), &ratings, &gate());
        for (row, title) in matrix.titles().iter().enumerate() {
            assert_eq!(matrix.row_of(title), Some(row));
            assert_eq!(matrix.title(row), Some(title.as_str()));
        }
        assert_eq!(matrix.row_of("Amelie"), None);
    }
}
