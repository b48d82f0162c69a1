use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use crate::scoring::affinity::{AffinityParams, DEFAULT_GENRE_TOLERANCE};
use crate::scoring::DEFAULT_TOP_N;

pub const DEFAULT_CATALOG_PATH: &str = "./dataset/movie.csv";
pub const DEFAULT_STORE_PATH: &str = "./ratings.json";

/// Central configuration loaded from environment variables.
///
/// Nothing here is secret. The .env file is loaded automatically at startup
/// via dotenvy, so local overrides can live there.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog CSV (`movieId,title,genres`)
    pub catalog_path: String,
    /// Rating store. `.db`, `.sqlite` or `.sqlite3` selects SQLite,
    /// anything else the JSON document store.
    pub store_path: String,
    /// How many recommendations to return when the caller doesn't say
    pub top_n: usize,
    /// Mean-rating distance under which two users agree on a genre
    pub genre_tolerance: f64,
    /// Most users returned by a similarity analysis
    pub max_matches: usize,
}

impl Default for Config {
    fn default() -> Self {
        let affinity = AffinityParams::default();
        Self {
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            store_path: DEFAULT_STORE_PATH.to_string(),
            top_n: DEFAULT_TOP_N,
            genre_tolerance: affinity.genre_tolerance,
            max_matches: affinity.max_results,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default; only malformed numbers are errors.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            catalog_path: env::var("REELMATCH_CATALOG").unwrap_or(defaults.catalog_path),
            store_path: env::var("REELMATCH_STORE").unwrap_or(defaults.store_path),
            top_n: parse_var("REELMATCH_TOP_N", defaults.top_n)?,
            genre_tolerance: parse_var("REELMATCH_GENRE_TOLERANCE", DEFAULT_GENRE_TOLERANCE)?,
            max_matches: parse_var("REELMATCH_MAX_MATCHES", defaults.max_matches)?,
        })
    }

    /// Affinity tunables with the configured tolerance and result cap.
    pub fn affinity_params(&self) -> AffinityParams {
        AffinityParams {
            genre_tolerance: self.genre_tolerance,
            max_results: self.max_matches,
            ..AffinityParams::default()
        }
    }

    /// Check that the catalog file exists.
    /// Call this before any operation that needs the feature index.
    pub fn require_catalog(&self) -> Result<()> {
        if !Path::new(&self.catalog_path).is_file() {
            anyhow::bail!(
                "Catalog not found at {}\n\
                 Set REELMATCH_CATALOG in your .env file to the movies CSV \
                 (columns: movieId,title,genres).",
                self.catalog_path
            );
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} is not a valid value: {raw:?}")),
        _ => Ok(default),
    }
}
