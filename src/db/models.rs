// Data models: what the rating store holds, in native and persisted form.
//
// The persisted document keys items by the decimal string of their id (JSON
// object keys are strings) and keeps values loosely typed. `UserRecord` is the
// native form with integer ids and validated scores. The TryFrom/From pair
// below is the only place ids cross between the two representations.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::ItemId;
use crate::error::{EngineError, EngineResult};

/// Lowest and highest accepted rating.
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// A validated rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> EngineResult<Self> {
        if (MIN_SCORE..=MAX_SCORE).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(EngineError::InvalidRequest(format!(
                "score {value} is outside {MIN_SCORE}..={MAX_SCORE}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

/// One user's ratings, feedback, and served recommendations, with native ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserRecord {
    pub ratings: BTreeMap<ItemId, Score>,
    pub feedback: BTreeMap<ItemId, bool>,
    /// Items already served as recommendations, in first-served order.
    pub recommended: Vec<ItemId>,
}

impl UserRecord {
    /// Ids of every item the user gave feedback on, liked or not.
    pub fn feedback_ids(&self) -> HashSet<ItemId> {
        self.feedback.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty() && self.feedback.is_empty() && self.recommended.is_empty()
    }

    /// Append served items, skipping ones already recorded.
    pub fn record_recommended(&mut self, items: &[ItemId]) {
        for &id in items {
            if !self.recommended.contains(&id) {
                self.recommended.push(id);
            }
        }
    }
}

/// Persisted per-user document:
/// `{"ratings": {"<id>": 1..5}, "feedback": {"<id>": bool}, "recommended": [id]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(default)]
    pub ratings: BTreeMap<String, Value>,
    #[serde(default)]
    pub feedback: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended: Vec<ItemId>,
}

/// Whole-store document: user id -> user document.
pub type StoreDocument = BTreeMap<String, StoredUser>;

/// Encode an item id as a persisted map key.
pub fn item_key(id: ItemId) -> String {
    id.to_string()
}

/// Decode a persisted map key into an item id.
pub fn parse_item_key(key: &str) -> EngineResult<ItemId> {
    key.parse::<ItemId>().map_err(|_| {
        EngineError::InvalidRequest(format!("stored item key {key:?} is not an integer id"))
    })
}

impl TryFrom<StoredUser> for UserRecord {
    type Error = EngineError;

    fn try_from(stored: StoredUser) -> EngineResult<Self> {
        let mut ratings = BTreeMap::new();
        for (key, value) in &stored.ratings {
            let id = parse_item_key(key)?;
            let raw = value.as_i64().ok_or_else(|| {
                EngineError::InvalidRequest(format!(
                    "stored rating for item {id} is not an integer: {value}"
                ))
            })?;
            ratings.insert(id, Score::new(raw)?);
        }

        let mut feedback = BTreeMap::new();
        for (key, value) in &stored.feedback {
            let id = parse_item_key(key)?;
            let liked = value.as_bool().ok_or_else(|| {
                EngineError::InvalidRequest(format!(
                    "stored feedback for item {id} is not a boolean: {value}"
                ))
            })?;
            feedback.insert(id, liked);
        }

        Ok(UserRecord {
            ratings,
            feedback,
            recommended: stored.recommended,
        })
    }
}

impl From<&UserRecord> for StoredUser {
    fn from(record: &UserRecord) -> Self {
        StoredUser {
            ratings: record
                .ratings
                .iter()
                .map(|(&id, score)| (item_key(id), Value::from(score.value())))
                .collect(),
            feedback: record
                .feedback
                .iter()
                .map(|(&id, &liked)| (item_key(id), Value::Bool(liked)))
                .collect(),
            recommended: record.recommended.clone(),
        }
    }
}

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: usize,
    pub ratings: usize,
    pub feedback: usize,
}

impl StoreStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        records.into_iter().fold(Self::default(), |acc, record| Self {
            users: acc.users + 1,
            ratings: acc.ratings + record.ratings.len(),
            feedback: acc.feedback + record.feedback.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(1).is_ok());
        assert!(Score::new(5).is_ok());
        assert!(matches!(Score::new(0), Err(EngineError::InvalidRequest(_))));
        assert!(matches!(Score::new(6), Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn test_stored_user_coerces_string_keys() {
        let stored: StoredUser = serde_json::from_value(json!({
            "ratings": {"1": 5, "42": 3},
            "feedback": {"7": false}
        }))
        .unwrap();
        let record = UserRecord::try_from(stored).unwrap();
        assert_eq!(record.ratings[&42].value(), 3);
        assert_eq!(record.feedback.get(&7), Some(&false));
        assert!(record.recommended.is_empty());
    }

    #[test]
    fn test_corrupt_rating_is_invalid_request() {
        for bad in [json!("five"), json!(4.5), json!(9), json!(null)] {
            let stored: StoredUser =
                serde_json::from_value(json!({ "ratings": { "1": bad } })).unwrap();
            assert!(matches!(
                UserRecord::try_from(stored),
                Err(EngineError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_non_integer_key_is_invalid_request() {
        let stored: StoredUser =
            serde_json::from_value(json!({ "ratings": { "tt0133093": 4 } })).unwrap();
        assert!(matches!(
            UserRecord::try_from(stored),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_record_to_stored_uses_string_keys() {
        let mut record = UserRecord::default();
        record.ratings.insert(12, Score::new(4).unwrap());
        record.feedback.insert(3, true);
        let value = serde_json::to_value(StoredUser::from(&record)).unwrap();
        assert_eq!(value, json!({ "ratings": {"12": 4}, "feedback": {"3": true} }));
    }

    #[test]
    fn test_record_recommended_deduplicates() {
        let mut record = UserRecord::default();
        record.record_recommended(&[3, 1]);
        record.record_recommended(&[1, 2]);
        assert_eq!(record.recommended, vec![3, 1, 2]);
    }
}
