// Recommendation scorer: content-based weighted aggregation.
//
// For every item the user rated, walk its similarity row and add
// `similarity * score` to each candidate. Contributions are summed, not
// averaged: an item close to several rated movies, or to one rated highly,
// rises to the top. Scores are not normalized by the number of
// rated items; changing that changes the ranking.
//
// Candidates are every catalog item the user has neither rated nor given
// feedback on. Exclusion happens before scoring, so an excluded item never
// holds a slot.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Item, ItemId};
use crate::db::models::Score;
use crate::error::{EngineError, EngineResult};
use crate::features::SimilarityMatrix;

/// Default number of recommendations returned.
pub const DEFAULT_TOP_N: usize = 5;

/// One recommended item with its accumulated relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub id: ItemId,
    pub title: String,
    pub genres: String,
    pub score: f64,
}

impl ScoredItem {
    fn from_item(item: &Item, score: f64) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            genres: item.genre_label(),
            score,
        }
    }
}

/// Ranked recommendations, most relevant first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub items: Vec<ScoredItem>,
    /// Rated item ids the catalog doesn't know; they contributed nothing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ItemId>,
}

impl Recommendations {
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }
}

/// Rank every unrated, unreviewed catalog item for a user.
///
/// Fails with `InvalidRequest` when `ratings` is empty or `top_n` is zero.
/// Rated ids missing from the catalog are skipped, not fatal. Ties keep
/// catalog order.
pub fn recommend(
    user_id: &str,
    ratings: &BTreeMap<ItemId, Score>,
    feedback_ids: &HashSet<ItemId>,
    similarity: &SimilarityMatrix,
    catalog: &Catalog,
    top_n: usize,
) -> EngineResult<Recommendations> {
    if ratings.is_empty() {
        return Err(EngineError::InvalidRequest(format!(
            "user {user_id} has no ratings to recommend from"
        )));
    }
    if top_n == 0 {
        return Err(EngineError::InvalidRequest(
            "number of recommendations must be at least 1".to_string(),
        ));
    }
    if similarity.len() != catalog.len() {
        return Err(EngineError::InvalidRequest(format!(
            "similarity matrix covers {} items but the catalog has {}",
            similarity.len(),
            catalog.len()
        )));
    }

    let size = catalog.len();

    let mut excluded = vec![false; size];
    for id in ratings.keys().chain(feedback_ids.iter()) {
        if let Some(pos) = catalog.position(*id) {
            excluded[pos] = true;
        }
    }

    let mut scores = vec![0.0_f64; size];
    let mut skipped = Vec::new();

    for (&rated_id, &score) in ratings {
        let Some(rated_pos) = catalog.position(rated_id) else {
            let err = EngineError::missing_from_catalog(rated_id);
            warn!(user_id, error = %err, "Skipping rated item");
            skipped.push(rated_id);
            continue;
        };

        let weight = score.as_f64();
        for (candidate, sim) in similarity.row(rated_pos).iter().enumerate() {
            if !excluded[candidate] {
                scores[candidate] += sim * weight;
            }
        }
    }

    let mut candidates: Vec<usize> = (0..size).filter(|&pos| !excluded[pos]).collect();
    // sort_by is stable: equal scores stay in catalog order
    candidates.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    candidates.truncate(top_n);

    let items: Vec<ScoredItem> = candidates
        .into_iter()
        .map(|pos| ScoredItem::from_item(&catalog.items()[pos], scores[pos]))
        .collect();

    debug!(
        user_id,
        rated = ratings.len(),
        excluded = excluded.iter().filter(|&&e| e).count(),
        returned = items.len(),
        "Scored recommendation candidates"
    );

    Ok(Recommendations { items, skipped })
}
