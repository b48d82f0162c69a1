// Feedback summary: how recommendations landed with a user.
//
// Counts likes and dislikes, and the hit rate over items that were actually
// served. Feedback on items that were never recommended (the user found them
// some other way) still counts toward liked/disliked but not the hit rate.

use serde::Serialize;

use super::profile::round2;
use crate::db::models::UserRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeedbackSummary {
    /// Items served to the user and recorded in their history
    pub recommended: usize,
    pub liked: usize,
    pub disliked: usize,
    /// Liked items among the recommended ones
    pub liked_recommended: usize,
    /// `liked_recommended / recommended`, 0 when nothing was served
    pub hit_rate: f64,
}

impl FeedbackSummary {
    pub fn from_record(record: &UserRecord) -> Self {
        let liked = record.feedback.values().filter(|&&liked| liked).count();
        let disliked = record.feedback.len() - liked;
        let recommended = record.recommended.len();
        let liked_recommended = record
            .recommended
            .iter()
            .filter(|id| record.feedback.get(*id) == Some(&true))
            .count();
        let hit_rate = if recommended == 0 {
            0.0
        } else {
            round2(liked_recommended as f64 / recommended as f64)
        };

        Self {
            recommended,
            liked,
            disliked,
            liked_recommended,
            hit_rate,
        }
    }
}
