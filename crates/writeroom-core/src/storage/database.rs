//! SQLite-backed key-value storage.
//!
//! The session manager's state lives in a single row of the `kv` table.
//! Other keys are free for callers.

use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use super::state::{StateStore, STATE_KEY};
use crate::error::{Result, StorageError};

/// SQLite database for state storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/writeroom/writeroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("writeroom.db");
        Self::open_path(&path)
    }

    /// Open a database file at an explicit path.
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl StateStore for Database {
    fn read_blob(&self) -> Result<Option<String>> {
        Ok(self.kv_get(STATE_KEY)?)
    }

    fn write_blob(&mut self, blob: &str) -> Result<()> {
        self.kv_set(STATE_KEY, blob)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn state_blob_lives_under_one_key() {
        let mut db = Database::open_memory().unwrap();
        assert!(db.read_blob().unwrap().is_none());
        db.write_blob("{}").unwrap();
        assert_eq!(db.kv_get(STATE_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn malformed_row_is_tolerated() {
        let db = Database::open_memory().unwrap();
        db.kv_set(STATE_KEY, "[1, 2, 3]").unwrap();
        assert!(db.load_state().is_none());
    }
}
