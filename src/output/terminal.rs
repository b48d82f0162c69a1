// Colored terminal output for recommendations, matches and the catalog.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here.

use colored::Colorize;

use super::truncate_chars;
use crate::catalog::Item;
use crate::scoring::{AffinityReport, FeedbackSummary, GenreScore, Recommendations};

const TITLE_WIDTH: usize = 44;

/// Display catalog items (search results or a listing).
pub fn display_catalog(items: &[&Item], total: usize) {
    if items.is_empty() {
        println!("No movies matched.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Movies ({} of {}) ===", items.len(), total).bold()
    );
    println!(
        "  {:>7}  {:<47} {}",
        "Id".dimmed(),
        "Title".dimmed(),
        "Genres".dimmed()
    );
    println!("  {}", "-".repeat(78).dimmed());
    for item in items {
        println!(
            "  {:>7}  {:<47} {}",
            item.id,
            truncate_chars(&item.title, TITLE_WIDTH),
            item.genre_label().dimmed()
        );
    }
    println!();
}

/// Display a ranked recommendation list.
pub fn display_recommendations(user_id: &str, recs: &Recommendations) {
    if recs.items.is_empty() {
        println!("Nothing left to recommend to {user_id}: every movie is rated or reviewed.");
    } else {
        println!(
            "\n{}",
            format!("=== Recommendations for {} ===", user_id).bold()
        );
        println!(
            "  {:>4}  {:>7}  {:<47} {:>6}",
            "Rank".dimmed(),
            "Id".dimmed(),
            "Title".dimmed(),
            "Score".dimmed()
        );
        println!("  {}", "-".repeat(70).dimmed());
        for (i, item) in recs.items.iter().enumerate() {
            println!(
                "  {:>4}. {:>7}  {:<47} {:>6.2}",
                i + 1,
                item.id,
                truncate_chars(&item.title, TITLE_WIDTH),
                item.score
            );
            println!("  {:>15}{}", "", item.genres.dimmed());
        }
    }
    display_skipped(&recs.skipped);
    println!();
}

/// Display a similar-users report.
pub fn display_affinity(report: &AffinityReport) {
    println!(
        "\n{}",
        format!("=== Users similar to {} ===", report.target_user).bold()
    );
    println!("  Your top genres: {}", format_genres(&report.target_top_genres));
    println!();

    if report.matches.is_empty() {
        println!("  No other users to compare against.");
    } else {
        println!(
            "  {:<20} {:>10}  {:>6}  {:>6}  {:>7}",
            "User".dimmed(),
            "Similarity".dimmed(),
            "Genres".dimmed(),
            "Movies".dimmed(),
            "Ratings".dimmed()
        );
        println!("  {}", "-".repeat(60).dimmed());
        for m in &report.matches {
            println!(
                "  {:<20} {:>10}  {:>6}  {:>6}  {:>7}",
                truncate_chars(&m.user_id, 17),
                colorize_similarity(m.similarity),
                m.genres_in_common,
                m.items_in_common,
                m.total_ratings
            );
            println!("    {}", format_genres(&m.top_genres).dimmed());
        }
    }
    display_skipped(&report.skipped);
    println!();
}

/// Display like/dislike counts for a user.
pub fn display_feedback_summary(user_id: &str, summary: &FeedbackSummary) {
    println!("\n{}", format!("=== Feedback from {} ===", user_id).bold());
    println!("  Recommended: {}", summary.recommended);
    println!(
        "  Liked: {}  Disliked: {}",
        summary.liked.to_string().green(),
        summary.disliked.to_string().red()
    );
    println!(
        "  Hit rate: {:.0}% ({} of {} served movies liked)",
        summary.hit_rate * 100.0,
        summary.liked_recommended,
        summary.recommended
    );
    println!();
}

fn display_skipped(skipped: &[i64]) {
    if !skipped.is_empty() {
        let ids: Vec<String> = skipped.iter().map(|id| id.to_string()).collect();
        println!(
            "  {} skipped rated movies missing from the catalog: {}",
            "!".yellow(),
            ids.join(", ")
        );
    }
}

fn format_genres(genres: &[GenreScore]) -> String {
    if genres.is_empty() {
        return "none".to_string();
    }
    genres
        .iter()
        .map(|g| format!("{} ({:.2})", g.genre, g.mean))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Colorize a similarity value by strength.
fn colorize_similarity(similarity: f64) -> colored::ColoredString {
    let text = format!("{similarity:.3}");
    if similarity >= 0.9 {
        text.green().bold()
    } else if similarity >= 0.6 {
        text.green()
    } else if similarity >= 0.3 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
