// Unit tests for the rating store backends.
//
// Runs the same behavior against the JSON document store (temp files) and,
// with the `sqlite` feature, the SQLite store (in-memory): last write wins,
// served-history dedup, per-user isolation, and corrupt persisted values
// surfacing as InvalidRequest.

use std::path::PathBuf;
use std::sync::Arc;

use reelmatch::db::models::Score;
use reelmatch::db::{open_store, JsonFileStore, RatingStore, StoreBackend};
use reelmatch::error::EngineError;

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "reelmatch-store-{}-{}.{}",
        name,
        std::process::id(),
        ext
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn score(value: i64) -> Score {
    Score::new(value).unwrap()
}

async fn exercise_store(store: &dyn RatingStore) {
    store.upsert_rating("ana", 1, score(2)).await.unwrap();
    store.upsert_rating("ana", 1, score(5)).await.unwrap();
    store.upsert_rating("ana", 2, score(3)).await.unwrap();
    store.upsert_feedback("ana", 7, true).await.unwrap();
    store.upsert_feedback("ana", 7, false).await.unwrap();
    store.upsert_rating("bo", 2, score(1)).await.unwrap();
    store.append_recommended("ana", &[9, 8]).await.unwrap();
    store.append_recommended("ana", &[8, 6]).await.unwrap();

    let ana = store.load_user("ana").await.unwrap().unwrap();
    assert_eq!(ana.ratings.len(), 2);
    assert_eq!(ana.ratings[&1].value(), 5);
    assert_eq!(ana.feedback.get(&7), Some(&false));
    assert_eq!(ana.recommended, vec![9, 8, 6]);

    let bo = store.load_user("bo").await.unwrap().unwrap();
    assert_eq!(bo.ratings.len(), 1);
    assert!(bo.feedback.is_empty());

    assert!(store.load_user("nobody").await.unwrap().is_none());

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.ratings, 3);
    assert_eq!(stats.feedback, 1);
}

// ============================================================
// JSON document store
// ============================================================

#[tokio::test]
async fn json_store_behaves() {
    let store = JsonFileStore::new(temp_path("behaves", "json"));
    exercise_store(&store).await;
}

#[tokio::test]
async fn json_store_survives_reopen() {
    let path = temp_path("reopen", "json");
    {
        let store = JsonFileStore::new(&path);
        store.upsert_rating("ana", 318, score(4)).await.unwrap();
    }
    let reopened = JsonFileStore::new(&path);
    let ana = reopened.load_user("ana").await.unwrap().unwrap();
    assert_eq!(ana.ratings[&318].value(), 4);
}

#[tokio::test]
async fn json_store_reads_original_document_layout() {
    let path = temp_path("layout", "json");
    std::fs::write(
        &path,
        r#"{"ana": {"ratings": {"1": 5, "2": 3}, "feedback": {"4": true}}}"#,
    )
    .unwrap();
    let store = JsonFileStore::new(&path);
    let all = store.load_all().await.unwrap();
    assert_eq!(all["ana"].ratings.len(), 2);
    assert_eq!(all["ana"].feedback.get(&4), Some(&true));
    assert!(all["ana"].recommended.is_empty());
}

#[tokio::test]
async fn json_store_corrupt_score_is_invalid_request() {
    let path = temp_path("corrupt", "json");
    std::fs::write(&path, r#"{"ana": {"ratings": {"1": "five"}}}"#).unwrap();
    let store = JsonFileStore::new(&path);

    let err = EngineError::from(store.load_all().await.unwrap_err());
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}

#[tokio::test]
async fn json_store_out_of_range_score_is_invalid_request() {
    let path = temp_path("range", "json");
    std::fs::write(&path, r#"{"ana": {"ratings": {"1": 9}}}"#).unwrap();
    let store = JsonFileStore::new(&path);

    let err = EngineError::from(store.load_user("ana").await.unwrap_err());
    assert_eq!(err.kind(), "invalid_request");
}

#[tokio::test]
async fn json_store_non_integer_key_is_invalid_request() {
    let path = temp_path("badkey", "json");
    std::fs::write(&path, r#"{"ana": {"ratings": {"one": 4}}}"#).unwrap();
    let store = JsonFileStore::new(&path);

    let err = EngineError::from(store.load_all().await.unwrap_err());
    assert_eq!(err.kind(), "invalid_request");
}

#[tokio::test]
async fn json_store_invalid_json_is_storage_error() {
    let path = temp_path("garbage", "json");
    std::fs::write(&path, "{not json").unwrap();
    let store = JsonFileStore::new(&path);

    let err = EngineError::from(store.load_all().await.unwrap_err());
    assert_eq!(err.kind(), "storage");
}

#[tokio::test]
async fn concurrent_json_writes_are_serialized() {
    let store = Arc::new(JsonFileStore::new(temp_path("concurrent", "json")));
    let mut handles = Vec::new();
    for item in 1..=20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.upsert_rating("ana", item, score(3)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    let ana = store.load_user("ana").await.unwrap().unwrap();
    assert_eq!(ana.ratings.len(), 20);
}

// ============================================================
// Backend selection
// ============================================================

#[test]
fn backend_selected_by_extension() {
    assert_eq!(StoreBackend::for_path("./ratings.json"), StoreBackend::Json);
    assert_eq!(StoreBackend::for_path("ratings"), StoreBackend::Json);
    assert_eq!(StoreBackend::for_path("data/ratings.db"), StoreBackend::Sqlite);
    assert_eq!(StoreBackend::for_path("x.SQLITE3"), StoreBackend::Sqlite);
}

#[tokio::test]
async fn open_store_creates_json_document() {
    let path = temp_path("open", "json");
    let store = open_store(path.to_str().unwrap()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    assert_eq!(store.stats().await.unwrap().users, 0);
}

// ============================================================
// SQLite store
// ============================================================

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use reelmatch::db::SqliteStore;

    #[tokio::test]
    async fn sqlite_store_behaves() {
        let store = SqliteStore::in_memory().unwrap();
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn sqlite_file_store_via_open_store() {
        let path = temp_path("open", "db");
        let store = open_store(path.to_str().unwrap()).await.unwrap();
        store.upsert_rating("ana", 3, score(4)).await.unwrap();
        let ana = store.load_user("ana").await.unwrap().unwrap();
        assert_eq!(ana.ratings[&3].value(), 4);
    }
}
