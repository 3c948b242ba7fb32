//! Parsers for the rating history tables and the JSON record stores.
//!
//! - movies_metadata.csv: one row per movie, many columns; only the ones
//!   [`RawMovieRecord`] carries are read
//! - ratings.csv: userId,movieId,rating,timestamp
//! - movies.json / users.json: arrays of catalog items and users
//!
//! Rows that cannot be read are skipped and counted, never defaulted.

use crate::error::{DataLoadError, Result};
use crate::generated::SkippedEntry;
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Columns the rating matrix cannot be built without
const REQUIRED_METADATA_COLUMNS: [&str; 4] =
    ["id", "original_title", "original_language", "vote_count"];

const REQUIRED_RATING_COLUMNS: [&str; 3] = ["userId", "movieId", "rating"];

/// One metadata row; unparseable optional cells read as `None`
#[derive(Debug, Deserialize)]
struct MetadataRow {
    #[serde(default)]
    id: String,
    #[serde(rename = "original_title", default, deserialize_with = "csv::invalid_option")]
    title: Option<String>,
    #[serde(rename = "original_language", default, deserialize_with = "csv::invalid_option")]
    language: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_count: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    overview: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    runtime: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_average: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    genres: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    poster_path: Option<String>,
}

impl From<MetadataRow> for RawMovieRecord {
    fn from(row: MetadataRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            language: row.language,
            vote_count: row.vote_count,
            overview: row.overview,
            release_date: row.release_date,
            runtime: row.runtime,
            vote_average: row.vote_average,
            genres: row.genres,
            poster_path: row.poster_path,
        }
    }
}

/// One ratings row; the timestamp column is ignored
#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: UserId,
    // The movie id stays textual; coercion belongs to the join
    #[serde(rename = "movieId", default)]
    movie_id: String,
    rating: f32,
}

impl From<RatingRow> for RawRating {
    fn from(row: RatingRow) -> Self {
        RawRating::new(row.user_id, row.movie_id, row.rating)
    }
}

/// Coerce a textual movie id to a number.
///
/// Accepts plain integers and integral floats ("862", " 862 ", "862.0").
/// Everything else (dates, blanks, fractions, negatives) fails.
pub fn coerce_movie_id(raw: &str) -> Option<MovieId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<MovieId>() {
        return Some(id);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value <= MovieId::MAX as f64 {
        Some(value as MovieId)
    } else {
        None
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn table_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Fail with `MissingColumn` for the first required column the header lacks
fn require_columns<R: Read>(
    csv_reader: &mut csv::Reader<R>,
    file: &str,
    required: &[&str],
) -> Result<()> {
    let headers = csv_reader.headers().map_err(|source| DataLoadError::Csv {
        file: file.to_string(),
        source,
    })?;
    match required.iter().find(|name| !headers.iter().any(|h| h == **name)) {
        Some(column) => Err(DataLoadError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Parse the movie metadata table from a reader
pub fn read_movie_metadata<R: Read>(reader: R, file: &str) -> Result<Vec<RawMovieRecord>> {
    let mut csv_reader = table_reader(reader);
    require_columns(&mut csv_reader, file, &REQUIRED_METADATA_COLUMNS)?;

    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for (line_no, row) in csv_reader.deserialize::<MetadataRow>().enumerate() {
        match row {
            Ok(row) => movies.push(row.into()),
            Err(e) => {
                debug!("Skipping unreadable row {} in {}: {}", line_no + 2, file, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unreadable rows in {}", skipped, file);
    }
    Ok(movies)
}

/// Parse the ratings table from a reader
///
/// Format: userId,movieId,rating[,timestamp]
pub fn read_ratings<R: Read>(reader: R, file: &str) -> Result<Vec<RawRating>> {
    let mut csv_reader = table_reader(reader);
    require_columns(&mut csv_reader, file, &REQUIRED_RATING_COLUMNS)?;

    let mut ratings = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize::<RatingRow>() {
        match row {
            Ok(row) => ratings.push(row.into()),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unreadable rows in {}", skipped, file);
    }
    Ok(ratings)
}

/// Parse movies_metadata.csv
pub fn parse_movie_metadata(path: &Path) -> Result<Vec<RawMovieRecord>> {
    read_movie_metadata(open(path)?, &path.display().to_string())
}

/// Parse ratings.csv
pub fn parse_ratings(path: &Path) -> Result<Vec<RawRating>> {
    read_ratings(open(path)?, &path.display().to_string())
}

/// Records decoded from a JSON store, plus the elements that were not valid
#[derive(Debug, Clone)]
pub struct JsonRecords<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedEntry>,
}

/// Decode a JSON array element by element.
///
/// The document itself must be an array; an element that does not decode as
/// `T` is reported in `skipped` and the rest are kept.
pub fn read_json_records<T: DeserializeOwned>(bytes: &[u8]) -> Result<JsonRecords<T>> {
    let elements: Vec<Value> = serde_json::from_slice(bytes)?;

    let mut records = Vec::with_capacity(elements.len());
    let mut skipped = Vec::new();
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(record) => records.push(record),
            Err(e) => skipped.push(SkippedEntry {
                index,
                reason: e.to_string(),
            }),
        }
    }
    Ok(JsonRecords { records, skipped })
}

/// Load a JSON array of records.
///
/// A missing or undecodable file yields an empty list: the record stores are
/// created lazily by the surrounding application. Invalid elements are
/// logged and dropped.
pub fn load_json_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!("Record store {} not found, starting empty", path.display());
            return Vec::new();
        }
    };
    match read_json_records(&bytes) {
        Ok(JsonRecords { records, skipped }) => {
            for entry in &skipped {
                warn!(
                    "Skipping record {} in {}: {}",
                    entry.index,
                    path.display(),
                    entry.reason
                );
            }
            debug!("Loaded {} records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            warn!("Record store {} is malformed ({}), starting empty", path.display(), e);
            Vec::new()
        }
    }
}
