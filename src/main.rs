use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};

use reelmatch::config::Config;
use reelmatch::db::RatingStore;
use reelmatch::pipeline::Recommender;

/// reelmatch: content-based movie recommendations.
///
/// Rates movies, recommends unseen ones by genre similarity, and finds
/// users with similar taste.
#[derive(Parser)]
#[command(name = "reelmatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the rating store
    Init,

    /// List or search the movie catalog
    Catalog {
        /// Case-insensitive title search
        #[arg(long, short)]
        query: Option<String>,

        /// Max movies to show (default: 20)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Rate a movie from 1 to 5
    Rate {
        user: String,
        movie: i64,
        score: i64,
    },

    /// Like (or --dislike) a movie
    Feedback {
        user: String,
        movie: i64,

        /// Record a dislike instead of a like
        #[arg(long)]
        dislike: bool,
    },

    /// Recommend unseen movies for a user
    Recommend {
        user: String,

        /// Number of movies (default: REELMATCH_TOP_N or 5)
        #[arg(long)]
        limit: Option<usize>,

        /// Record the served movies so feedback counts toward the hit rate
        #[arg(long)]
        record: bool,
    },

    /// Find users with similar genre taste
    Similar { user: String },

    /// Show a user's like/dislike counts and hit rate
    Stats { user: String },

    /// Show system status (catalog size, store location and counts)
    Status,

    /// Start the JSON API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reelmatch=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing reelmatch store...");
            let store = reelmatch::db::open_store(&config.store_path).await?;
            println!("Rating store ready at: {}", store.location());
            if config.require_catalog().is_err() {
                println!(
                    "\n{} catalog not found at {}. Set REELMATCH_CATALOG in your .env file.",
                    "!".yellow(),
                    config.catalog_path
                );
            } else {
                println!("\nNext step: rate a few movies, e.g.");
                println!("  reelmatch catalog --query heat");
                println!("  reelmatch rate <user> <movie-id> 5");
            }
        }

        Commands::Catalog { query, limit } => {
            let engine = load_recommender(&config)?;
            let matches = engine.search(query.as_deref().unwrap_or(""));
            let shown: Vec<_> = matches.iter().take(limit).copied().collect();
            reelmatch::output::terminal::display_catalog(&shown, matches.len());
        }

        Commands::Rate { user, movie, score } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            engine
                .record_rating(store.as_ref(), &user, movie, score)
                .await?;
            let title = movie_title(&engine, movie);
            println!("{} rated {} {}/5", user, title.bold(), score);
        }

        Commands::Feedback {
            user,
            movie,
            dislike,
        } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            engine
                .record_feedback(store.as_ref(), &user, movie, !dislike)
                .await?;
            let verdict = if dislike {
                "disliked".red()
            } else {
                "liked".green()
            };
            println!("{} {} {}", user, verdict, movie_title(&engine, movie).bold());
        }

        Commands::Recommend {
            user,
            limit,
            record,
        } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            let recs = engine
                .recommend_for(store.as_ref(), &user, limit.unwrap_or(config.top_n), record)
                .await?;
            reelmatch::output::terminal::display_recommendations(&user, &recs);
            if record && !recs.items.is_empty() {
                println!(
                    "{}",
                    format!("Recorded {} served movies for {}", recs.items.len(), user).dimmed()
                );
            }
        }

        Commands::Similar { user } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            let report = engine.similar_users(store.as_ref(), &user).await?;
            reelmatch::output::terminal::display_affinity(&report);
        }

        Commands::Stats { user } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            let summary = engine.feedback_summary(store.as_ref(), &user).await?;
            reelmatch::output::terminal::display_feedback_summary(&user, &summary);
        }

        Commands::Status => {
            let engine = match load_recommender(&config) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    warn!(error = %e, "Catalog unavailable");
                    None
                }
            };
            let store: Arc<dyn RatingStore> = open_existing_store(&config).await?;
            reelmatch::status::show(&config, engine.as_ref(), &store).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let engine = load_recommender(&config)?;
            let store = reelmatch::db::open_store(&config.store_path).await?;
            reelmatch::web::run_server(config, engine, store, port, &bind).await?;
        }
    }

    Ok(())
}

/// Load the catalog CSV and build the feature index.
fn load_recommender(config: &Config) -> Result<Recommender> {
    config.require_catalog()?;
    let catalog = reelmatch::catalog::loader::load_csv(std::path::Path::new(&config.catalog_path))
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;
    Ok(Recommender::new(catalog).with_affinity_params(config.affinity_params()))
}

/// Open the store without creating it, so `status` can report a missing one.
async fn open_existing_store(config: &Config) -> Result<Arc<dyn RatingStore>> {
    if std::path::Path::new(&config.store_path).exists() {
        reelmatch::db::open_store(&config.store_path).await
    } else {
        Ok(Arc::new(reelmatch::db::JsonFileStore::new(&config.store_path)))
    }
}

fn movie_title(engine: &Recommender, movie: i64) -> String {
    engine
        .catalog()
        .get(movie)
        .map(|item| item.title.clone())
        .unwrap_or_else(|| movie.to_string())
}
