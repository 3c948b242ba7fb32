//! Simple test harness for the recommendation service.
//!
//! Loads a data directory, then answers one similarity query and one
//! recommendation request.
//!
//! Usage: server [DATA_DIR] [TITLE] [USER_ID]

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::DataPaths;
use server::{error_kind, RecommendationService};
use similarity::ModelConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let title = args.next().unwrap_or_else(|| "The Matrix".to_string());
    let user_id = args.next().unwrap_or_else(|| "1".to_string());

    info!("Starting reel-match server test harness");
    let service = RecommendationService::load(DataPaths::in_dir(&data_dir), ModelConfig::default()).await?;

    match service.similar_movies(&title).await {
        Ok(similar) => {
            info!(
                "'{}' matched '{}' ({:.1})",
                title, similar.matched.title, similar.matched.score
            );
            for (i, movie) in similar.movies.iter().enumerate() {
                info!("{}. {} ({}) - {:.1}", i + 1, movie.title, movie.release_year, movie.rating);
            }
        }
        Err(e) => warn!("No similar movies for '{}' ({:?}): {:#}", title, error_kind(&e), e),
    }

    let recommendations = service.recommended_for_user(&user_id, None).await?;
    info!("Received {} recommendations for user {}:", recommendations.movies.len(), user_id);
    for (i, movie) in recommendations.movies.iter().enumerate() {
        info!("{}. {} [{}]", i + 1, movie.title, movie.genres.join(", "));
    }
    if !recommendations.diagnostics.is_empty() {
        warn!("Skipped favorites: {:?}", recommendations.diagnostics.skipped);
    }

    Ok(())
}
