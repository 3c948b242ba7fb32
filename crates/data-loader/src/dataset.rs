//! Loading everything the engine needs from a data directory.
//!
//! The two rating-history tables are large and independent, so they are
//! parsed in parallel with `rayon::join`. The JSON stores are small.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::parser;
use crate::types::{RawMovieRecord, RawRating};
use crate::users::UserDirectory;
use std::path::{Path, PathBuf};
use tracing::info;

/// Locations of the data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub movie_metadata: PathBuf,
    pub ratings: PathBuf,
    pub catalog: PathBuf,
    pub users: PathBuf,
}

impl DataPaths {
    /// Standard file names under one directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            movie_metadata: data_dir.join("movies_metadata.csv"),
            ratings: data_dir.join("ratings.csv"),
            catalog: data_dir.join("movies.json"),
            users: data_dir.join("users.json"),
        }
    }
}

/// The rating-history tables, as read
#[derive(Debug, Clone, Default)]
pub struct RatingTables {
    pub movies: Vec<RawMovieRecord>,
    pub ratings: Vec<RawRating>,
}

impl RatingTables {
    /// Parse the metadata and ratings tables in parallel
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let (movies, ratings) = rayon::join(
            || parser::parse_movie_metadata(&paths.movie_metadata),
            || parser::parse_ratings(&paths.ratings),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!(
            "Loaded {} metadata rows and {} ratings",
            movies.len(),
            ratings.len()
        );
        Ok(Self { movies, ratings })
    }
}

/// Everything loaded from a data directory
#[derive(Debug, Clone)]
pub struct DataSet {
    pub tables: RatingTables,
    pub catalog: Catalog,
    pub users: UserDirectory,
}

impl DataSet {
    /// Load the rating tables and the record stores.
    ///
    /// Missing rating tables are an error; missing record stores load empty.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        info!("Loading data from {:?}", paths);

        let tables = RatingTables::load(paths)?;
        let catalog = Catalog::load(&paths.catalog);
        let users = UserDirectory::load(&paths.users);

        info!(
            "Catalog has {} movies, user directory has {} users",
            catalog.len(),
            users.len()
        );
        Ok(Self {
            tables,
            catalog,
            users,
        })
    }

    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        Self::load(&DataPaths::in_dir(data_dir))
    }
}
