// SqliteStore: rusqlite backend implementing the RatingStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock serializes concurrent writers to the same user.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Score, UserRecord};
use super::traits::RatingStore;
use crate::catalog::ItemId;

pub struct SqliteStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection, location: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            location: location.into(),
        }
    }

    /// In-memory store with the schema applied (tests, dry runs).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn, ":memory:"))
    }

    pub async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }
}

#[async_trait]
impl RatingStore for SqliteStore {
    fn location(&self) -> String {
        self.location.clone()
    }

    async fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        super::schema::create_tables(&conn)
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock().await;
        super::queries::load_user(&conn, user_id)
    }

    async fn load_all(&self) -> Result<BTreeMap<String, UserRecord>> {
        let conn = self.conn.lock().await;
        super::queries::load_all(&conn)
    }

    async fn upsert_rating(&self, user_id: &str, item_id: ItemId, score: Score) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_rating(&conn, user_id, item_id, score)
    }

    async fn upsert_feedback(&self, user_id: &str, item_id: ItemId, liked: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_feedback(&conn, user_id, item_id, liked)
    }

    async fn append_recommended(&self, user_id: &str, item_ids: &[ItemId]) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::append_recommended(&conn, user_id, item_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trait_rating_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_user("ana").await.unwrap().is_none());
        store.upsert_rating("ana", 10, Score::new(3).unwrap()).await.unwrap();
        let record = store.load_user("ana").await.unwrap().unwrap();
        assert_eq!(record.ratings[&10].value(), 3);
    }

    #[tokio::test]
    async fn test_trait_stats() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert_rating("ana", 1, Score::new(3).unwrap()).await.unwrap();
        store.upsert_rating("ana", 2, Score::new(4).unwrap()).await.unwrap();
        store.upsert_feedback("bo", 1, true).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.users, 2);
        assert_eq!(stats.ratings, 2);
        assert_eq!(stats.feedback, 1);
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.table_count().await.unwrap(), 4);
    }
}
