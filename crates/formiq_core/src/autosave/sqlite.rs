//! SQLite-backed autosave storage.
//!
//! # Invariants
//! - The record is stored as JSON in one row keyed by [`AUTOSAVE_SLOT`].
//! - Writes are upserts; there is never more than one row per slot.

use super::{AutosaveRecord, AutosaveResult, AutosaveStorage, AUTOSAVE_SLOT};
use rusqlite::{params, Connection, OptionalExtension};

/// Autosave storage over a migrated SQLite connection.
pub struct SqliteAutosaveStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAutosaveStorage<'conn> {
    /// Creates storage from a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AutosaveStorage for SqliteAutosaveStorage<'_> {
    fn load(&self) -> AutosaveResult<Option<AutosaveRecord>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM autosave_records WHERE slot = ?1;",
                [AUTOSAVE_SLOT],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn save(&self, record: &AutosaveRecord) -> AutosaveResult<()> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO autosave_records (slot, payload, saved_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at;",
            params![AUTOSAVE_SLOT, payload, record.timestamp.to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear(&self) -> AutosaveResult<()> {
        self.conn.execute(
            "DELETE FROM autosave_records WHERE slot = ?1;",
            [AUTOSAVE_SLOT],
        )?;
        Ok(())
    }
}
