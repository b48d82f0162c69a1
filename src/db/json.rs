// JsonFileStore: the rating store as a single JSON document on disk.
//
// Layout: `{ "<user_id>": { "ratings": {...}, "feedback": {...} } }`.
// Every operation reads the whole file; writes hold an in-process mutex
// across read-modify-write and replace the file atomically (write a sibling
// temp file, then rename over the original).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::{item_key, Score, StoreDocument, StoredUser, UserRecord};
use super::traits::RatingStore;
use crate::catalog::ItemId;

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. A missing or blank file is an empty store.
    async fn read_document(&self) -> Result<StoreDocument> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreDocument::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read rating store at {}", self.path.display())
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(StoreDocument::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Rating store at {} is not valid JSON", self.path.display()))
    }

    async fn write_document(&self, document: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create directory for {}", self.path.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    /// Apply a change to one user's persisted document under the write lock.
    async fn update_user<F>(&self, user_id: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoredUser) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        change(document.entry(user_id.to_string()).or_default());
        self.write_document(&document).await?;
        debug!(user_id, path = %self.path.display(), "Rating store updated");
        Ok(())
    }
}

#[async_trait]
impl RatingStore for JsonFileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn initialize(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            // Parse it so a corrupt file is reported at init time.
            self.read_document().await?;
            return Ok(());
        }
        self.write_document(&StoreDocument::new()).await
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let mut document = self.read_document().await?;
        match document.remove(user_id) {
            Some(stored) => Ok(Some(UserRecord::try_from(stored)?)),
            None => Ok(None),
        }
    }

    async fn load_all(&self) -> Result<BTreeMap<String, UserRecord>> {
        let document = self.read_document().await?;
        let mut records = BTreeMap::new();
        for (user_id, stored) in document {
            records.insert(user_id, UserRecord::try_from(stored)?);
        }
        Ok(records)
    }

    async fn upsert_rating(&self, user_id: &str, item_id: ItemId, score: Score) -> Result<()> {
        self.update_user(user_id, |user| {
            user.ratings.insert(item_key(item_id), Value::from(score.value()));
        })
        .await
    }

    async fn upsert_feedback(&self, user_id: &str, item_id: ItemId, liked: bool) -> Result<()> {
        self.update_user(user_id, |user| {
            user.feedback.insert(item_key(item_id), Value::Bool(liked));
        })
        .await
    }

    async fn append_recommended(&self, user_id: &str, item_ids: &[ItemId]) -> Result<()> {
        let item_ids = item_ids.to_vec();
        self.update_user(user_id, move |user| {
            for id in item_ids {
                if !user.recommended.contains(&id) {
                    user.recommended.push(id);
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFileStore {
        let path = std::env::temp_dir().join(format!(
            "reelmatch-json-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        JsonFileStore::new(path)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let store = temp_store("missing");
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.load_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rating_last_write_wins() {
        let store = temp_store("last-write");
        store.upsert_rating("ana", 1, Score::new(2).unwrap()).await.unwrap();
        store.upsert_rating("ana", 1, Score::new(5).unwrap()).await.unwrap();
        let record = store.load_user("ana").await.unwrap().unwrap();
        assert_eq!(record.ratings.len(), 1);
        assert_eq!(record.ratings[&1].value(), 5);
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_persisted_keys_are_strings() {
        let store = temp_store("string-keys");
        store.upsert_rating("ana", 318, Score::new(4).unwrap()).await.unwrap();
        store.upsert_feedback("ana", 50, true).await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["ana"]["ratings"]["318"], 4);
        assert_eq!(value["ana"]["feedback"]["50"], true);
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_initialize_writes_empty_object() {
        let store = temp_store("init");
        store.initialize().await.unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "{}");
        // Second call leaves the file alone
        store.upsert_feedback("bo", 1, false).await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.load_user("bo").await.unwrap().is_some());
        let _ = std::fs::remove_file(store.path());
    }
}
