//! Model configuration.
//!
//! Defaults reproduce the behavior the engine has always had: English
//! titles with more than 999 votes, Euclidean distance, Indel-ratio title
//! matching with a 60/100 confidence floor and five neighbors per query.

use std::fmt;
use std::str::FromStr;

/// Distance used to rank rows against a query vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// `1 - cosine similarity`
    Cosine,
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "cosine" => Ok(DistanceMetric::Cosine),
            other => Err(format!("unknown metric '{}' (expected euclidean or cosine)", other)),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "euclidean"),
            DistanceMetric::Cosine => write!(f, "cosine"),
        }
    }
}

/// String similarity used by the title resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleScorer {
    /// Indel ratio: `2 * LCS / (len_a + len_b)`
    #[default]
    Ratio,
    Levenshtein,
    JaroWinkler,
}

impl FromStr for TitleScorer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "ratio" => Ok(TitleScorer::Ratio),
            "levenshtein" => Ok(TitleScorer::Levenshtein),
            "jarowinkler" => Ok(TitleScorer::JaroWinkler),
            other => Err(format!("unknown scorer '{}'", other)),
        }
    }
}

/// Everything that shapes a trained model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Catalog rows must be in this original language
    pub reference_language: String,
    /// Catalog rows need strictly more votes than this
    pub min_vote_count: f64,
    pub metric: DistanceMetric,
    pub scorer: TitleScorer,
    /// Minimum title score on a 0-100 scale
    pub confidence_threshold: f64,
    /// Neighbors returned when the caller does not ask for a count
    pub neighbors: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            reference_language: "en".to_string(),
            min_vote_count: 999.0,
            metric: DistanceMetric::Euclidean,
            scorer: TitleScorer::Ratio,
            confidence_threshold: 60.0,
            neighbors: 5,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_language(mut self, language: impl Into<String>) -> Self {
        self.reference_language = language.into();
        self
    }

    pub fn with_min_vote_count(mut self, count: f64) -> Self {
        self.min_vote_count = count;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_scorer(mut self, scorer: TitleScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }
}
