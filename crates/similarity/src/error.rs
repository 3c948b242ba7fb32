//! Errors raised by the similarity path.
//!
//! The similarity path prefers failing over guessing: a wrong title match is
//! worse than no answer, so every degraded situation is an error variant.

use crate::fuzzy::TitleMatch;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityError {
    /// The rating/catalog join produced no rows
    #[error("no ratings joined to the catalog, the similarity model is empty")]
    EmptyModel,

    /// Fuzzy resolution stayed below the confidence threshold
    #[error("no sufficiently similar title for '{query}'")]
    NoMatch {
        query: String,
        /// Best candidate seen, if there were any candidates at all
        best: Option<TitleMatch>,
    },

    /// A query reached an index with no rows, or an engine with no model
    #[error("no similarity model is available")]
    ModelUnavailable,

    #[error("query vector has dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The title is not a row of the index
    #[error("unknown title '{0}'")]
    UnknownTitle(String),
}

/// How a caller should surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service cannot answer right now
    Unavailable,
    /// The request was fine but nothing matched
    NotFound,
    /// The request itself was malformed
    BadRequest,
}

impl SimilarityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimilarityError::EmptyModel => ErrorKind::Unavailable,
            SimilarityError::NoMatch { .. } => ErrorKind::NotFound,
            SimilarityError::ModelUnavailable
            | SimilarityError::DimensionMismatch { .. }
            | SimilarityError::UnknownTitle(_) => ErrorKind::BadRequest,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
