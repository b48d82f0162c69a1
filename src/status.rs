// System status display: catalog size, store location, store counts.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{RatingStore, StoreBackend};
use crate::pipeline::Recommender;

/// Display system status to the terminal.
///
/// `recommender` is None when the catalog could not be loaded; the store
/// section is still shown.
pub async fn show(
    config: &Config,
    recommender: Option<&Recommender>,
    store: &Arc<dyn RatingStore>,
) -> Result<()> {
    match recommender {
        Some(engine) => println!(
            "Catalog: {} ({} movies, {} genres)",
            config.catalog_path,
            engine.catalog().len(),
            engine.index().vocabulary().len()
        ),
        None => {
            println!("Catalog: not found at {}", config.catalog_path);
            println!("  Set REELMATCH_CATALOG to the movies CSV");
        }
    }

    let backend = match StoreBackend::for_path(&config.store_path) {
        StoreBackend::Json => "json",
        StoreBackend::Sqlite => "sqlite",
    };
    let location = store.location();
    match std::fs::metadata(&location) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            println!(
                "Store: {} [{}] ({}, modified {})",
                location,
                backend,
                format_bytes(meta.len()),
                modified
            );
        }
        Err(_) if !Path::new(&location).exists() => {
            println!("Store: {} [{}] not initialized", location, backend);
            println!("\nRun `reelmatch init` to create it.");
            return Ok(());
        }
        Err(e) => println!("Store: {} [{}] unreadable ({})", location, backend, e),
    }

    let stats = store.stats().await?;
    println!(
        "Users: {}  Ratings: {}  Feedback: {}",
        stats.users, stats.ratings, stats.feedback
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
