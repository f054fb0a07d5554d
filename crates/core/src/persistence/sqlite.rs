//! SQLite-backed key-value store for hunt progress.
//!
//! A single `kv` table holds JSON values keyed by name, so several hunts can
//! share one database file by using different keys.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    hunt::HuntProgress,
    persistence::{PersistenceError, ProgressStore, Result},
};

pub const DEFAULT_KEY: &str = "hunt_progress";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

pub struct SqliteProgressStore {
    connection: Connection,
    key: String,
}

impl SqliteProgressStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection,
            key: DEFAULT_KEY.to_owned(),
        })
    }

    /// Store under a different key, e.g. one per hunt configuration.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// When the record was last written, if it exists.
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .connection
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|e| PersistenceError::Unavailable(format!("corrupt timestamp {raw:?}: {e}")))
        })
        .transpose()
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self) -> Result<Option<HuntProgress>> {
        let raw: Option<String> = self
            .connection
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, progress: &HuntProgress) -> Result<()> {
        let json = serde_json::to_string(progress)?;
        self.connection.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.key, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.connection
            .execute("DELETE FROM kv WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}
