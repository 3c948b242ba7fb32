//! # Sources Crate
//!
//! Candidate generation for the favorites-based recommender.
//!
//! ## Components
//!
//! ### Favorites Context
//! The user's favorite ids plus the genres they imply, built once per
//! request. Favorites that can't be used are reported, not dropped silently.
//!
//! ### Catalog Source
//! Every distinct catalog item, for the filter pipeline to narrow down.
//!
//! ### Top-Rated Source
//! Best-rated items, for unknown users and for topping up short lists.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{build_favorites_context, CatalogSource, TopRatedSource};
//!
//! let (context, diagnostics) = build_favorites_context(&favorites, &catalog);
//! let candidates = CatalogSource::new(&catalog).get_candidates();
//! let fallback = TopRatedSource::new(&catalog).get_candidates(&context.favorites, 10);
//! ```

pub mod catalog_source;
pub mod favorites;
pub mod top_rated;
pub mod types;

pub use catalog_source::CatalogSource;
pub use favorites::build_favorites_context;
pub use top_rated::TopRatedSource;
pub use types::{
    Candidate, CandidateSource, FavoritesContext, FavoritesDiagnostics, SkipReason, SkippedFavorite,
};
