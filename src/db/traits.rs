// RatingStore trait: backend-agnostic async interface to the rating store.
//
// Implementors: JsonFileStore (one JSON document on disk) and, with the
// `sqlite` feature, SqliteStore (wraps rusqlite). All methods are async so a
// blocking backend behind a Mutex and a file backend fit the same interface.
//
// Writes are upserts: the last write for a (user, item) pair wins. Backends
// serialize their own read-modify-write cycles; callers never lock.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Score, StoreStats, UserRecord};
use crate::catalog::ItemId;

#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Human-readable location of the store (path), for status output.
    fn location(&self) -> String;

    /// Create the backing storage if it does not exist yet. Idempotent.
    async fn initialize(&self) -> Result<()>;

    /// Load one user's record, or None if the user has never written anything.
    async fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Load every user's record, keyed by user id.
    async fn load_all(&self) -> Result<BTreeMap<String, UserRecord>>;

    /// Insert or overwrite the rating for (user, item).
    async fn upsert_rating(&self, user_id: &str, item_id: ItemId, score: Score) -> Result<()>;

    /// Insert or overwrite the like/dislike for (user, item).
    async fn upsert_feedback(&self, user_id: &str, item_id: ItemId, liked: bool) -> Result<()>;

    /// Append served recommendations to the user's history, skipping ids
    /// already present.
    async fn append_recommended(&self, user_id: &str, item_ids: &[ItemId]) -> Result<()>;

    /// Aggregate counts across all users.
    async fn stats(&self) -> Result<StoreStats> {
        let all = self.load_all().await?;
        Ok(StoreStats::from_records(all.values()))
    }
}
