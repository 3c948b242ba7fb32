//! Pipeline for filtering candidates and assembling recommendation lists.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - The favorites recommender, which runs the pipeline and falls back to
//!   top-rated items when too little survives
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{recommend_for_user, RecommendOptions};
//!
//! let mut rng = rand::rng();
//! let (items, diagnostics) =
//!     recommend_for_user(Some(&favorites), catalog.all_movies(), None, &RecommendOptions::default(), &mut rng);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod recommender;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use recommender::{recommend_for_user, RecommendOptions};
pub use traits::Filter;
