//! # Data Loader Crate
//!
//! Loads the rating history and the display catalog the recommenders work on.
//!
//! ## Main Components
//!
//! - **types**: Raw table rows and validated records
//! - **parser**: CSV tables and JSON record stores
//! - **catalog**: The [`CatalogStore`] trait and the in-memory [`Catalog`]
//! - **users**: The [`FavoritesStore`] trait and [`UserDirectory`]
//! - **metadata**: Hydrating similarity results into catalog items
//! - **generated**: Parsing movie lists produced by a text-generation assistant
//! - **dataset**: Loading a whole data directory
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{CatalogStore, DataSet};
//! use std::path::Path;
//!
//! let data = DataSet::load_from_dir(Path::new("data"))?;
//! println!("{} ratings", data.tables.ratings.len());
//! println!("{} catalog movies", data.catalog.all_movies().len());
//! ```

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod generated;
pub mod metadata;
pub mod parser;
pub mod types;
pub mod users;

// Re-export commonly used types for convenience
pub use catalog::{Catalog, CatalogStore};
pub use dataset::{DataPaths, DataSet, RatingTables};
pub use error::{DataLoadError, Result};
pub use generated::{parse_generated_movies, GeneratedMovies, SkippedEntry};
pub use metadata::MetadataIndex;
pub use parser::coerce_movie_id;
pub use types::{
    // Type aliases
    ItemId,
    MovieId,
    UserId,
    // Records
    CatalogItem,
    RatingEvent,
    RawMovieRecord,
    RawRating,
    User,
};
pub use users::{FavoritesStore, UserDirectory};
