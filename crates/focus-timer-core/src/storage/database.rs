//! SQLite-backed key-value store.
//!
//! Holds the session and statistics records in a single `kv` table.

use rusqlite::{params, Connection};
use std::path::Path;

use super::{data_dir, KvStore};
use crate::error::StorageError;

pub const DB_FILE: &str = "focus-timer.db";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/focus-timer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("test").unwrap().is_none());
        db.set("test", "hello").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "hello");
        db.set("test", "again").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "again");
        db.delete("test").unwrap();
        assert!(db.get("test").unwrap().is_none());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let db = Database::open_at(&path).unwrap();
            db.set("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("v"));
    }
}
