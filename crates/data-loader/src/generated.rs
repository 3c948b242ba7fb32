//! Parsing movie lists returned by a text-generation assistant.
//!
//! The assistant is asked for a bare JSON array of catalog items but often
//! wraps it in a fenced code block. Elements that do not validate as a
//! [`CatalogItem`] are skipped and reported, never silently dropped.

use crate::error::{DataLoadError, Result};
use crate::types::CatalogItem;
use serde_json::Value;
use tracing::debug;

/// An array element that was not a valid catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    /// Position in the returned array
    pub index: usize,
    pub reason: String,
}

/// Movies recovered from a reply, plus what was skipped
#[derive(Debug, Clone, Default)]
pub struct GeneratedMovies {
    pub movies: Vec<CatalogItem>,
    pub skipped: Vec<SkippedEntry>,
}

/// Extract the body of the first fenced code block, if there is one.
///
/// Accepts both ```` ```json ```` and bare ```` ``` ```` fences.
fn fenced_body(reply: &str) -> Option<&str> {
    let start = reply.find("```")?;
    let after_fence = &reply[start + 3..];
    let body_start = after_fence.strip_prefix("json").unwrap_or(after_fence);
    let end = body_start.find("```")?;
    let body = body_start[..end].trim();
    if body.is_empty() { None } else { Some(body) }
}

/// Parse an assistant reply into catalog items
pub fn parse_generated_movies(reply: &str) -> Result<GeneratedMovies> {
    let reply = reply.trim();
    let body = fenced_body(reply).unwrap_or(reply);

    let value: Value = serde_json::from_str(body)?;
    let Value::Array(elements) = value else {
        return Err(DataLoadError::MalformedResponse(
            "expected a JSON array of movies".to_string(),
        ));
    };

    let mut parsed = GeneratedMovies::default();
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<CatalogItem>(element) {
            Ok(movie) => parsed.movies.push(movie),
            Err(e) => parsed.skipped.push(SkippedEntry {
                index,
                reason: e.to_string(),
            }),
        }
    }

    debug!(
        "Parsed {} generated movies ({} skipped)",
        parsed.movies.len(),
        parsed.skipped.len()
    );
    Ok(parsed)
}
