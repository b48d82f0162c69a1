// Rating store: where ratings, feedback, and served recommendations live.
//
// Two backends behind the RatingStore trait: a single JSON document (the
// default, `./ratings.json`) and SQLite (with the `sqlite` feature, selected
// by a `.db` / `.sqlite` / `.sqlite3` path). The engine never touches either
// directly; it goes through `Arc<dyn RatingStore>`.

pub mod json;
pub mod models;
#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub use json::JsonFileStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traits::RatingStore;

/// Which backend a store path selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
}

impl StoreBackend {
    pub fn for_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("db") | Some("sqlite") | Some("sqlite3") => StoreBackend::Sqlite,
            _ => StoreBackend::Json,
        }
    }
}

/// Open the store at `path`, creating it if needed.
pub async fn open_store(path: &str) -> Result<Arc<dyn RatingStore>> {
    let store: Arc<dyn RatingStore> = match StoreBackend::for_path(path) {
        StoreBackend::Json => Arc::new(JsonFileStore::new(path)),
        StoreBackend::Sqlite => open_sqlite(path)?,
    };
    store.initialize().await?;
    Ok(store)
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &str) -> Result<Arc<dyn RatingStore>> {
    use anyhow::Context;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {path}"))?;
        }
    }

    let conn = rusqlite::Connection::open(path)
        .with_context(|| format!("Failed to open database at {path}"))?;
    // WAL lets readers proceed while a writer holds the lock
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(Arc::new(SqliteStore::new(conn, path)))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(path: &str) -> Result<Arc<dyn RatingStore>> {
    anyhow::bail!(
        "{path} looks like a SQLite database but the 'sqlite' feature is not compiled in.\n\
         Rebuild with: cargo build --features sqlite"
    )
}
