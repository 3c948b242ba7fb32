//! Fuzzy resolution of free-text queries to known titles.
//!
//! Every candidate is scored on a 0-100 scale and the single best one wins,
//! provided it clears the confidence threshold. Below the threshold the
//! resolver fails instead of guessing.
//!
//! ```ignore
//! let titles = ["The Matrix", "The Matrix Reloaded"];
//! let hit = resolve_title("matrix reloded", titles)?;
//! assert_eq!(hit.title, "The Matrix Reloaded");
//! ```

use crate::config::TitleScorer;
use crate::error::{Result, SimilarityError};
use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::debug;

/// Default minimum score for a match
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 60.0;

/// A resolved title and how confident the match is (0-100)
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    pub title: String,
    pub score: f64,
}

/// Indel similarity of two strings on a 0-100 scale.
///
/// `2 * LCS(a, b) / (|a| + |b|)`, counted in chars and case-sensitive.
/// Two empty strings are identical.
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    // Longest common subsequence, one DP row at a time
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &x in &a {
        for (j, &y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    let lcs = previous[b.len()];

    100.0 * (2 * lcs) as f64 / total as f64
}

/// Score two strings with the chosen scorer, 0-100
pub fn score(scorer: TitleScorer, query: &str, candidate: &str) -> f64 {
    match scorer {
        TitleScorer::Ratio => indel_ratio(query, candidate),
        TitleScorer::Levenshtein => 100.0 * normalized_levenshtein(query, candidate),
        TitleScorer::JaroWinkler => 100.0 * jaro_winkler(query, candidate),
    }
}

/// Resolves queries against a set of titles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleResolver {
    scorer: TitleScorer,
    threshold: f64,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(TitleScorer::default(), DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl TitleResolver {
    pub fn new(scorer: TitleScorer, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best title for `query`, first one wins on equal scores
    pub fn resolve<'a, I>(&self, query: &str, titles: I) -> Result<TitleMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<TitleMatch> = None;
        for title in titles {
            let score = score(self.scorer, query, title);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(TitleMatch {
                    title: title.to_string(),
                    score,
                });
            }
        }

        match best {
            Some(hit) if hit.score >= self.threshold => {
                debug!("Resolved '{}' to '{}' ({:.1})", query, hit.title, hit.score);
                Ok(hit)
            }
            best => {
                debug!("No title for '{}' (best: {:?})", query, best);
                Err(SimilarityError::NoMatch {
                    query: query.to_string(),
                    best,
                })
            }
        }
    }
}

/// Resolve with the default scorer and threshold
pub fn resolve_title<'a, I>(query: &str, known_titles: I) -> Result<TitleMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    TitleResolver::default().resolve(query, known_titles)
}
