use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{CatalogItem, DataPaths};
use server::{error_kind, RecommendationService};
use similarity::{DistanceMetric, ErrorKind, ModelConfig, TitleScorer};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// reel-match - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-match")]
#[command(about = "Similar movies from rating history, recommendations from favorites", long_about = None)]
struct Cli {
    /// Directory holding movies_metadata.csv, ratings.csv, movies.json and users.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of neighbors per similarity query, the movie itself included
    #[arg(short, long)]
    k: Option<usize>,

    /// Distance metric: euclidean or cosine
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Title scorer: ratio, levenshtein or jaro-winkler
    #[arg(long)]
    scorer: Option<TitleScorer>,

    /// Minimum title match score, 0-100
    #[arg(long)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find movies rated like the given title
    Similar {
        /// Movie title, misspellings allowed
        #[arg(long)]
        title: String,
    },

    /// Get movie recommendations for a user from their favorites
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: String,

        /// Only recommend movies with this mood
        #[arg(long)]
        mood: Option<String>,
    },

    /// Search the catalog by title or description
    Search {
        /// Case-insensitive substring
        #[arg(long)]
        query: String,
    },

    /// List catalog movies in a genre
    Genre {
        #[arg(long)]
        name: String,
    },

    /// List catalog movies with a mood
    Mood {
        #[arg(long)]
        name: String,
    },

    /// Show one catalog movie
    Movie {
        #[arg(long)]
        id: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        let mut config = ModelConfig::default();
        if let Some(k) = self.k {
            config = config.with_neighbors(k);
        }
        if let Some(metric) = self.metric {
            config = config.with_metric(metric);
        }
        if let Some(scorer) = self.scorer {
            config = config.with_scorer(scorer);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_confidence_threshold(threshold);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.model_config();
    debug!("Model config: {:?}", config);

    println!("Loading data from {}...", cli.data_dir.display());
    let start = Instant::now();
    let service = RecommendationService::load(DataPaths::in_dir(&cli.data_dir), config)
        .await
        .context("Failed to load data")?;
    println!("{} Loaded data in {:?}", "✓".green(), start.elapsed());
    if !service.is_ready() {
        println!(
            "{} No similarity model: no rating matched the catalog",
            "!".yellow()
        );
    }

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Similar { title } => handle_similar(&service, &title).await?,
        Commands::Recommend { user_id, mood } => {
            handle_recommend(&service, &user_id, mood.as_deref()).await?
        }
        Commands::Search { query } => {
            let movies = service.catalog().search(&query);
            print_movies(&format!("Search results for '{}':", query), movies);
        }
        Commands::Genre { name } => {
            let movies = service.catalog().by_genre(&name);
            print_movies(&format!("{} movies:", name), movies);
        }
        Commands::Mood { name } => {
            let movies = service.catalog().by_mood(&name);
            print_movies(&format!("Movies for a {} mood:", name), movies);
        }
        Commands::Movie { id } => handle_movie(&service, &id)?,
        Commands::Benchmark { requests } => handle_benchmark(&service, requests).await?,
    }

    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(service: &RecommendationService, title: &str) -> Result<()> {
    match service.similar_movies(title).await {
        Ok(similar) => {
            println!(
                "{}",
                format!(
                    "Movies similar to '{}' (match score {:.1}):",
                    similar.matched.title, similar.matched.score
                )
                .bold()
                .blue()
            );
            for (rank, movie) in similar.movies.iter().enumerate() {
                print_movie(rank + 1, movie);
            }
            Ok(())
        }
        Err(e) => match error_kind(&e) {
            Some(ErrorKind::NotFound) => Err(anyhow!("Movie '{}' not found", title)),
            Some(ErrorKind::Unavailable) | Some(ErrorKind::BadRequest) => {
                Err(e.context("Similarity model unavailable"))
            }
            None => Err(e),
        },
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(
    service: &RecommendationService,
    user_id: &str,
    mood: Option<&str>,
) -> Result<()> {
    let recommendations = service.recommended_for_user(user_id, mood).await?;

    let header = match mood {
        Some(mood) => format!("Recommendations for user {} ({} mood):", user_id, mood),
        None => format!("Recommendations for user {}:", user_id),
    };
    print_movies(&header, &recommendations.movies);

    for skipped in &recommendations.diagnostics.skipped {
        println!(
            "{} favorite {} skipped: {:?}",
            "!".yellow(),
            skipped.id,
            skipped.reason
        );
    }
    Ok(())
}

/// Handle the 'movie' command
fn handle_movie(service: &RecommendationService, id: &str) -> Result<()> {
    let movie = service
        .movie(id)
        .ok_or_else(|| anyhow!("Movie {} not found", id))?;

    println!("{}", format!("{} ({})", movie.title, movie.release_year).bold().blue());
    println!("{}Rating: {:.1}", "• ".green(), movie.rating);
    println!("{}Duration: {}", "• ".green(), movie.duration);
    println!("{}Genres: {}", "• ".green(), movie.genres.join(", "));
    println!("{}Moods: {}", "• ".green(), movie.moods.join(", "));
    if !movie.poster_path.is_empty() {
        println!("{}Poster: {}", "• ".green(), movie.poster_path);
    }
    if !movie.description.is_empty() {
        println!("\n{}", movie.description);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(service: &RecommendationService, requests: usize) -> Result<()> {
    let model = service
        .engine()
        .snapshot()
        .context("Benchmark needs a similarity model")?;
    let titles = model.index().matrix().titles().to_vec();
    if titles.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark"));
    }

    // Alternate similarity queries and recommendation requests
    let mut handles = vec![];
    for i in 0..requests {
        let service = service.clone();
        let title = titles[rand::random_range(0..titles.len())].clone();
        let user_id = (rand::random_range(1..=1000u32)).to_string();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            if i % 2 == 0 {
                service.similar_movies(&title).await?;
            } else {
                service.recommended_for_user(&user_id, None).await?;
            }
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let wall = Instant::now();
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall = wall.elapsed();

    let total: Duration = timings.iter().sum();
    let avg_latency = total / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", requests);
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / wall.as_secs_f64()
    );

    Ok(())
}

fn print_movie(rank: usize, movie: &CatalogItem) {
    println!(
        "{}. {} ({}) [{}] - Rating: {:.1}",
        rank.to_string().green(),
        movie.title,
        movie.release_year,
        movie.genres.join(", "),
        movie.rating
    );
}

fn print_movies<'a>(header: &str, movies: impl IntoIterator<Item = &'a CatalogItem>) {
    println!("{}", header.bold().blue());
    let mut count = 0;
    for movie in movies {
        count += 1;
        print_movie(count, movie);
    }
    if count == 0 {
        println!("  (none)");
    }
}
