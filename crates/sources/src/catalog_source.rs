//! Catalog Source - every distinct catalog item as a candidate.
//!
//! The favorites pipeline starts from the whole catalog and narrows it
//! down with filters, so this source does no ranking of its own. Duplicate
//! catalog ids collapse to their first occurrence.

use crate::types::{Candidate, CandidateSource};
use data_loader::CatalogItem;
use std::collections::HashSet;
use tracing::{debug, instrument};

pub struct CatalogSource<'a> {
    catalog: &'a [CatalogItem],
}

impl<'a> CatalogSource<'a> {
    pub fn new(catalog: &'a [CatalogItem]) -> Self {
        Self { catalog }
    }

    /// All catalog items in catalog order, one per id
    #[instrument(skip(self), fields(catalog = self.catalog.len()))]
    pub fn get_candidates(&self) -> Vec<Candidate> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.catalog.len());
        let candidates: Vec<Candidate> = self
            .catalog
            .iter()
            .filter(|item| seen.insert(item.id.as_str()))
            .map(|item| Candidate::new(item.clone(), CandidateSource::Catalog))
            .collect();

        debug!("Generated {} catalog candidates", candidates.len());
        candidates
    }
}
