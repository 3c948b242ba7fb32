//! Error types for the data-loader crate.
//!
//! Loading is forgiving about individual bad rows (they are dropped and
//! counted) but strict about the files themselves: a table that cannot be
//! opened or whose header cannot be read is an error.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A CSV table could not be read
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is missing from a table header
    #[error("Missing column {column} in {file}")]
    MissingColumn { file: String, column: String },

    /// A JSON document could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text-generation reply did not contain a JSON array of movies
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
