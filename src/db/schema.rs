// Database schema: table creation and migrations for the SQLite store.
//
// Same version-table approach throughout: `schema_version` records which
// migrations have run, and each migration is a function that executes SQL.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet. Idempotent.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One active rating per (user, item); upserts overwrite
        CREATE TABLE IF NOT EXISTS ratings (
            user_id TEXT NOT NULL,
            item_id INTEGER NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, item_id)
        );

        -- Like (1) / dislike (0) per (user, item)
        CREATE TABLE IF NOT EXISTS feedback (
            user_id TEXT NOT NULL,
            item_id INTEGER NOT NULL,
            liked INTEGER NOT NULL CHECK (liked IN (0, 1)),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, item_id)
        );

        CREATE INDEX IF NOT EXISTS idx_ratings_item ON ratings(item_id);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: history of items served as recommendations.
    // `seq` keeps first-served order per user.
    run_migration(conn, 2, |c| {
        c.execute_batch(
            "CREATE TABLE recommended (
                user_id TEXT NOT NULL,
                item_id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                served_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, item_id)
            );",
        )
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count user-created tables (used by `init` to confirm setup).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
