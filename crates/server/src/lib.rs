//! Server crate for the reel-match recommendation engine.
//!
//! This crate contains the service that owns the trained similarity model,
//! the catalog and the user store, and exposes them through async entry
//! points.

pub mod service;

pub use service::{error_kind, Recommendations, RecommendationService, SimilarMovies};
