// SQLite queries: every SQL statement the SQLite store runs.
//
// Free functions over a borrowed Connection, so tests can drive them with an
// in-memory database directly. Scores read back go through Score::new, so a
// row that slipped past the CHECK constraint still fails validation.

use std::collections::BTreeMap;

use anyhow::Result;
use rusqlite::{params, Connection};

use super::models::{Score, UserRecord};
use crate::catalog::ItemId;

// --- Writes ---

/// Insert or overwrite a rating.
pub fn upsert_rating(conn: &Connection, user_id: &str, item_id: ItemId, score: Score) -> Result<()> {
    conn.execute(
        "INSERT INTO ratings (user_id, item_id, score, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(user_id, item_id) DO UPDATE SET
            score = ?3,
            updated_at = datetime('now')",
        params![user_id, item_id, score.value()],
    )?;
    Ok(())
}

/// Insert or overwrite a like/dislike.
pub fn upsert_feedback(conn: &Connection, user_id: &str, item_id: ItemId, liked: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO feedback (user_id, item_id, liked, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(user_id, item_id) DO UPDATE SET
            liked = ?3,
            updated_at = datetime('now')",
        params![user_id, item_id, liked],
    )?;
    Ok(())
}

/// Append served items after the user's current history; ids already
/// present keep their original position.
pub fn append_recommended(conn: &Connection, user_id: &str, item_ids: &[ItemId]) -> Result<()> {
    let next_seq: i64 = conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM recommended WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO recommended (user_id, item_id, seq) VALUES (?1, ?2, ?3)",
    )?;
    for (offset, item_id) in item_ids.iter().enumerate() {
        stmt.execute(params![user_id, item_id, next_seq + offset as i64])?;
    }
    Ok(())
}

// --- Reads ---

/// Load every user's record. Users appear once they have any row in any table.
pub fn load_all(conn: &Connection) -> Result<BTreeMap<String, UserRecord>> {
    let mut records: BTreeMap<String, UserRecord> = BTreeMap::new();

    let mut stmt = conn.prepare("SELECT user_id, item_id, score FROM ratings")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, ItemId>(1)?, row.get::<_, i64>(2)?))
    })?;
    for row in rows {
        let (user_id, item_id, score) = row?;
        records
            .entry(user_id)
            .or_default()
            .ratings
            .insert(item_id, Score::new(score)?);
    }

    let mut stmt = conn.prepare("SELECT user_id, item_id, liked FROM feedback")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, ItemId>(1)?, row.get::<_, bool>(2)?))
    })?;
    for row in rows {
        let (user_id, item_id, liked) = row?;
        records.entry(user_id).or_default().feedback.insert(item_id, liked);
    }

    let mut stmt =
        conn.prepare("SELECT user_id, item_id FROM recommended ORDER BY user_id, seq")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, ItemId>(1)?))
    })?;
    for row in rows {
        let (user_id, item_id) = row?;
        records.entry(user_id).or_default().recommended.push(item_id);
    }

    Ok(records)
}

/// Load one user's record, or None if they have no rows at all.
pub fn load_user(conn: &Connection, user_id: &str) -> Result<Option<UserRecord>> {
    let mut record = UserRecord::default();

    let mut stmt = conn.prepare("SELECT item_id, score FROM ratings WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, ItemId>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (item_id, score) = row?;
        record.ratings.insert(item_id, Score::new(score)?);
    }

    let mut stmt = conn.prepare("SELECT item_id, liked FROM feedback WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, ItemId>(0)?, row.get::<_, bool>(1)?))
    })?;
    for row in rows {
        let (item_id, liked) = row?;
        record.feedback.insert(item_id, liked);
    }

    let mut stmt =
        conn.prepare("SELECT item_id FROM recommended WHERE user_id = ?1 ORDER BY seq")?;
    let rows = stmt.query_map(params![user_id], |row| row.get::<_, ItemId>(0))?;
    for row in rows {
        record.recommended.push(row?);
    }

    if record.is_empty() {
        Ok(None)
    } else {
        Ok(Some(record))
    }
}
