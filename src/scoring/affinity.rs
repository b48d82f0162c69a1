// Affinity analyzer: user-to-user similarity over genre-preference profiles.
//
// Each user becomes a vector of per-genre mean ratings over the genres that
// anyone has rated (not the full catalog vocabulary). Users are compared by
// cosine similarity of those vectors; "genres in common" counts genres both
// users rated with means within a tolerance of each other.
//
// Computed on demand over all users: O(U·G·R). Nothing is cached.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::profile::{GenreProfile, GenreScore};
use crate::catalog::{Catalog, ItemId};
use crate::db::models::Score;
use crate::error::{EngineError, EngineResult};
use crate::features::{cosine_similarity, Vocabulary};

/// Largest difference between two users' mean ratings (1-5 scale) for a
/// genre to count as shared taste.
pub const DEFAULT_GENRE_TOLERANCE: f64 = 1.0;

/// Tunables for the affinity analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityParams {
    /// Agreement tolerance for "genres in common" (default 1.0)
    pub genre_tolerance: f64,
    /// Most matches returned (default 10)
    pub max_results: usize,
    /// Genres shown per matched user (default 3)
    pub match_top_genres: usize,
    /// Genres shown for the target user (default 5)
    pub target_top_genres: usize,
}

impl Default for AffinityParams {
    fn default() -> Self {
        Self {
            genre_tolerance: DEFAULT_GENRE_TOLERANCE,
            max_results: 10,
            match_top_genres: 3,
            target_top_genres: 5,
        }
    }
}

/// How closely one other user's taste matches the target's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMatch {
    pub user_id: String,
    /// Cosine similarity of genre vectors, in [0, 1]
    pub similarity: f64,
    pub genres_in_common: usize,
    pub items_in_common: usize,
    pub total_ratings: usize,
    pub top_genres: Vec<GenreScore>,
}

/// Result of comparing one user against everyone else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffinityReport {
    pub target_user: String,
    pub target_top_genres: Vec<GenreScore>,
    /// Best matches first; never includes the target user.
    pub matches: Vec<UserMatch>,
    /// Rated ids (any user) absent from the catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ItemId>,
}

/// Rank every other user by genre-taste similarity to `target_user_id`.
///
/// Fails with `NotFound` when the target has no ratings and with
/// `InsufficientData` when fewer than two users have any ratings.
pub fn analyze_similarity(
    target_user_id: &str,
    all_ratings: &BTreeMap<String, BTreeMap<ItemId, Score>>,
    catalog: &Catalog,
    params: &AffinityParams,
) -> EngineResult<AffinityReport> {
    let active: BTreeMap<&str, &BTreeMap<ItemId, Score>> = all_ratings
        .iter()
        .filter(|(_, ratings)| !ratings.is_empty())
        .map(|(user, ratings)| (user.as_str(), ratings))
        .collect();

    let Some(target_ratings) = active.get(target_user_id).copied() else {
        return Err(EngineError::NotFound(format!(
            "user {target_user_id} has no ratings"
        )));
    };
    if active.len() < 2 {
        return Err(EngineError::InsufficientData(format!(
            "need at least 2 users with ratings, found {}",
            active.len()
        )));
    }

    let profiles: BTreeMap<&str, GenreProfile> = active
        .iter()
        .map(|(user, ratings)| (*user, GenreProfile::build(ratings, catalog)))
        .collect();

    let skipped: BTreeSet<ItemId> = profiles
        .values()
        .flat_map(|profile| profile.missing_items.iter().copied())
        .collect();
    for &item_id in &skipped {
        let err = EngineError::missing_from_catalog(item_id);
        warn!(error = %err, "Skipping rated item in affinity analysis");
    }

    // Rating-driven vocabulary: only genres somebody has actually rated
    let rated_genres: BTreeSet<String> = profiles
        .values()
        .flat_map(|profile| profile.genres().map(str::to_string))
        .collect();
    let vocabulary = Vocabulary::from_tags(&rated_genres);

    let target_profile = &profiles[target_user_id];
    let target_vector = target_profile.vector(&vocabulary);
    let target_items: BTreeSet<ItemId> = target_ratings.keys().copied().collect();

    let mut matches: Vec<UserMatch> = profiles
        .iter()
        .filter(|(user, _)| **user != target_user_id)
        .map(|(user, profile)| {
            let vector = profile.vector(&vocabulary);
            let ratings = active[*user];
            UserMatch {
                user_id: user.to_string(),
                similarity: cosine_similarity(&target_vector, &vector),
                genres_in_common: genres_in_common(
                    &target_vector,
                    &vector,
                    params.genre_tolerance,
                ),
                items_in_common: ratings
                    .keys()
                    .filter(|id| target_items.contains(id))
                    .count(),
                total_ratings: ratings.len(),
                top_genres: profile.top_genres(params.match_top_genres),
            }
        })
        .collect();

    // Stable sort over user-id order: ties resolve to the lower user id
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(params.max_results);

    debug!(
        target_user_id,
        users = active.len(),
        genres = vocabulary.len(),
        returned = matches.len(),
        "Computed user affinity"
    );

    Ok(AffinityReport {
        target_user: target_user_id.to_string(),
        target_top_genres: target_profile.top_genres(params.target_top_genres),
        matches,
        skipped: skipped.into_iter().collect(),
    })
}

/// Count genres both users rated (non-zero mean) whose means differ by at
/// most `tolerance`.
pub fn genres_in_common(a: &[f64], b: &[f64], tolerance: f64) -> usize {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| **x > 0.0 && **y > 0.0 && (**x - **y).abs() <= tolerance)
        .count()
}
