mod config;
pub mod database;
pub mod memory;
pub mod records;

pub use config::Config;
pub use database::Database;
pub use memory::MemoryStore;
pub use records::{Restore, SavedSession, SESSION_KEY, STATS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Minimal string key-value store the session and statistics records live in.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `FOCUS_TIMER_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/focus-timer[-dev]/`, with the `-dev` suffix selected by
/// `FOCUS_TIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUS_TIMER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUS_TIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focus-timer-dev")
            } else {
                base_dir.join("focus-timer")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
