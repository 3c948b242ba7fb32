//! Turning raw metadata rows into displayable catalog items.
//!
//! Similarity results are plain titles; [`MetadataIndex`] maps them back to
//! the first metadata row carrying that title and fills a [`CatalogItem`]
//! from it.

use crate::types::{CatalogItem, RawMovieRecord};
use std::collections::HashMap;

/// Title lookup over the raw metadata rows
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    by_title: HashMap<String, RawMovieRecord>,
}

impl MetadataIndex {
    pub fn new(records: &[RawMovieRecord]) -> Self {
        let mut by_title = HashMap::new();
        for record in records {
            if let Some(title) = &record.title {
                by_title.entry(title.clone()).or_insert_with(|| record.clone());
            }
        }
        Self { by_title }
    }

    pub fn get(&self, title: &str) -> Option<&RawMovieRecord> {
        self.by_title.get(title)
    }

    /// Catalog item for a title, if any metadata row carries it
    pub fn hydrate(&self, title: &str) -> Option<CatalogItem> {
        self.get(title).map(hydrate)
    }
}

/// Build a catalog item from a metadata row.
///
/// Missing pieces fall back to neutral values: year 0, empty text, rating
/// 0.0. Poster paths are only kept when they are absolute URLs.
pub fn hydrate(record: &RawMovieRecord) -> CatalogItem {
    let release_year = record
        .release_date
        .as_deref()
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0);

    let genres = record
        .genres
        .as_deref()
        .map(parse_genre_names)
        .unwrap_or_default();

    let poster_path = record
        .poster_path
        .as_deref()
        .filter(|path| path.contains("http"))
        .unwrap_or_default()
        .to_string();

    CatalogItem {
        id: record.id.clone(),
        title: record.title.clone().unwrap_or_default(),
        description: record.overview.clone().unwrap_or_default(),
        release_year,
        duration: record.runtime.map(|r| format!("{:?}", r)).unwrap_or_default(),
        rating: record.vote_average.unwrap_or(0.0),
        genres,
        moods: Vec::new(),
        poster_path,
    }
}

/// Extract the `name` values from a stringified list of dicts.
///
/// Example: `[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': "Children's"}]`
/// yields `["Animation", "Children's"]`. Malformed input yields whatever
/// names could be read before the damage.
pub fn parse_genre_names(raw: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = raw;

    while let Some(key) = find_name_key(rest) {
        rest = rest[key..].trim_start();
        let Some(after_colon) = rest.strip_prefix(':') else {
            continue;
        };
        let value = after_colon.trim_start();
        let mut chars = value.char_indices();
        let quote = match chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            _ => {
                rest = value;
                continue;
            }
        };

        let mut name = String::new();
        let mut escaped = false;
        let mut end = None;
        for (i, c) in chars {
            if escaped {
                name.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                end = Some(i);
                break;
            } else {
                name.push(c);
            }
        }

        match end {
            Some(i) => {
                names.push(name);
                rest = &value[i + 1..];
            }
            None => break,
        }
    }

    names
}

/// Byte offset just past the next quoted `name` key
fn find_name_key(s: &str) -> Option<usize> {
    let single = s.find("'name'").map(|i| i + "'name'".len());
    let double = s.find("\"name\"").map(|i| i + "\"name\"".len());
    match (single, double) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
