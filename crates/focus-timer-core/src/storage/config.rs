//! TOML-based application configuration.
//!
//! Holds process-level preferences that sit outside the timer settings:
//! - Log filter for the tracing subscriber
//! - Store location override
//! - Terminal bell on chime events
//! - Resume-prompt window
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use super::records::DEFAULT_RESUME_WINDOW_MINS;
use crate::error::{ConfigError, CoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Path of the SQLite store. Defaults to `<data_dir>/focus-timer.db`.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Ring the terminal bell when a chime is requested.
    #[serde(default = "default_true")]
    pub terminal_bell: bool,
    /// Minutes within which a running session offers to resume.
    #[serde(default = "default_resume_window_mins")]
    pub resume_window_mins: i64,
}

fn default_log_filter() -> String {
    "warn".into()
}
fn default_true() -> bool {
    true
}
fn default_resume_window_mins() -> i64 {
    DEFAULT_RESUME_WINDOW_MINS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            database: None,
            terminal_bell: true,
            resume_window_mins: DEFAULT_RESUME_WINDOW_MINS,
        }
    }
}

impl Config {
    fn set_json_value(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let obj = root
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            // Optional paths serialize as null until set.
            _ if value.is_empty() || value == "none" => serde_json::Value::Null,
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and save. Unknown keys and values of the
    /// wrong type are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    pub fn resume_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.resume_window_mins.max(0))
    }

    /// Store path, honouring the `database` override.
    pub fn database_path(&self) -> Result<PathBuf, CoreError> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(super::database::DB_FILE)),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
