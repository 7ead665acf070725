use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::{
    DeleteOutcome, HistoryRecord, HistoryStore, Listing, remove_image, validate_identifier,
    validate_payload,
};
use crate::error::Result;

/// File name of the database inside the store directory.
pub const DB_FILE: &str = "history.db";

/// History kept in an embedded `SQLite` database next to the images.
#[derive(Debug)]
pub struct SqliteStore {
    dir: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    /// Open or create `history.db` in `dir` and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the DB cannot be opened or the schema cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        let conn = Connection::open(dir.join(DB_FILE))?;
        init_history_table(&conn)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            conn,
        })
    }
}

/// Create the history table if it does not exist. Idempotent.
///
/// # Errors
///
/// Returns an error if the table creation fails.
pub fn init_history_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier  TEXT    NOT NULL,
            payload     TEXT    NOT NULL,
            created_at  TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        );
        CREATE INDEX IF NOT EXISTS idx_history_identifier ON history(identifier);",
    )?;
    Ok(())
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        identifier: row.get(0)?,
        payload: row.get(1)?,
    })
}

impl HistoryStore for SqliteStore {
    fn image_dir(&self) -> &Path {
        &self.dir
    }

    fn append(&self, identifier: &str, payload: &str) -> Result<()> {
        validate_identifier(identifier)?;
        validate_payload(payload)?;
        self.conn.execute(
            "INSERT INTO history (identifier, payload) VALUES (?1, ?2)",
            rusqlite::params![identifier, payload],
        )?;
        tracing::debug!(identifier, "history row inserted");
        Ok(())
    }

    fn list_all(&self) -> Result<Listing> {
        let mut stmt = self
            .conn
            .prepare("SELECT identifier, payload FROM history ORDER BY id ASC")?;
        let rows = stmt.query_map([], map_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(Listing {
            records,
            corrupt: Vec::new(),
        })
    }

    fn find(&self, identifier: &str) -> Result<Option<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT identifier, payload FROM history
             WHERE identifier = ?1
             ORDER BY id ASC
             LIMIT 1",
        )?;
        let mut rows = stmt.query([identifier])?;
        match rows.next()? {
            Some(row) => Ok(Some(map_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, identifier: &str) -> Result<DeleteOutcome> {
        let image_path = self.image_path(identifier)?;
        let records_removed = self
            .conn
            .execute("DELETE FROM history WHERE identifier = ?1", [identifier])?;
        let image_removed = remove_image(&image_path)?;
        tracing::debug!(identifier, records_removed, image_removed, "history row deleted");
        Ok(DeleteOutcome {
            records_removed,
            image_removed,
        })
    }
}
