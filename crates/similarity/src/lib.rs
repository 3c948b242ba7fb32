//! # Similarity Crate
//!
//! Item-item similarity over the rating history: "people who rated this
//! movie the way you did also rated these".
//!
//! ## Components
//!
//! ### Rating Matrix ([`matrix`])
//! Quality-gates the catalog, joins ratings to it and pivots the result into
//! a sparse title × user matrix.
//!
//! ### Similarity Index ([`index`])
//! Exact k-nearest-neighbor search over the matrix rows, Euclidean or
//! cosine.
//!
//! ### Title Resolver ([`fuzzy`])
//! Maps a free-text query to the closest indexed title, or refuses when
//! nothing is close enough.
//!
//! ### Engine ([`engine`])
//! Owns the current trained model and swaps in retrained ones atomically.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{ModelConfig, SimilarityEngine};
//!
//! let engine = SimilarityEngine::train(ModelConfig::default(), &movies, &ratings)?;
//! let similar = engine.similar_to("matrix reloded", None)?;
//! for neighbor in &similar.neighbors {
//!     println!("{} ({:.3})", neighbor.title, neighbor.distance);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod matrix;

pub use config::{DistanceMetric, ModelConfig, TitleScorer};
pub use engine::{SimilarTitles, SimilarityEngine, SimilarityModel};
pub use error::{ErrorKind, Result, SimilarityError};
pub use fuzzy::{resolve_title, TitleMatch, TitleResolver};
pub use index::{build_index, Neighbor, RowHit, SimilarityIndex};
pub use matrix::{BuildReport, QualityGate, RatingMatrix};
