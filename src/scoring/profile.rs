// Genre profile: a user's mean rating per genre.
//
// Derived on demand from ratings, never stored. A genre's mean covers every
// rated item carrying that genre, so one 5-star "Action|Comedy" rating
// counts toward both Action and Comedy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{Catalog, ItemId};
use crate::db::models::Score;
use crate::features::Vocabulary;

/// A genre with a mean rating, rounded to 2 decimals for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreScore {
    pub genre: String,
    pub mean: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreProfile {
    means: BTreeMap<String, f64>,
    /// Rated ids that had no catalog entry and were left out.
    pub missing_items: Vec<ItemId>,
}

impl GenreProfile {
    /// Build the profile from a user's ratings.
    pub fn build(ratings: &BTreeMap<ItemId, Score>, catalog: &Catalog) -> Self {
        let mut totals: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        let mut missing_items = Vec::new();

        for (&item_id, &score) in ratings {
            let Some(item) = catalog.get(item_id) else {
                missing_items.push(item_id);
                continue;
            };
            for tag in &item.tags {
                let entry = totals.entry(tag.clone()).or_insert((0.0, 0));
                entry.0 += score.as_f64();
                entry.1 += 1;
            }
        }

        let means = totals
            .into_iter()
            .map(|(tag, (sum, count))| (tag, sum / count as f64))
            .collect();

        Self {
            means,
            missing_items,
        }
    }

    /// Mean rating for a genre; 0.0 if the user rated nothing carrying it.
    pub fn mean(&self, genre: &str) -> f64 {
        self.means.get(genre).copied().unwrap_or(0.0)
    }

    /// Genres this user has rated, in name order.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.means.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Dense vector of means laid out by the vocabulary.
    pub fn vector(&self, vocabulary: &Vocabulary) -> Vec<f64> {
        vocabulary.tags().iter().map(|tag| self.mean(tag)).collect()
    }

    /// Highest-mean genres, best first; ties go to the alphabetically
    /// earlier genre.
    pub fn top_genres(&self, n: usize) -> Vec<GenreScore> {
        let mut ranked: Vec<(&String, f64)> = self.means.iter().map(|(g, &m)| (g, m)).collect();
        // means iterate in name order and sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(genre, mean)| GenreScore {
                genre: genre.clone(),
                mean: round2(mean),
            })
            .collect()
    }
}
