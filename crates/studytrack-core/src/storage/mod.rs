//! Persistence collaborator and on-disk locations.
//!
//! Everything the core persists is a JSON document under a profile-scoped
//! string key. Backends only need `get` and `set`.

mod config;
pub mod database;
pub mod memory;
pub mod profile;

pub use config::{Config, LogConfig, ReminderConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use profile::{ProfileStore, UserProfile};

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StorageError};

/// Key holding the active [`UserProfile`].
pub const ACTIVE_PROFILE_KEY: &str = "activeProfile";

/// Minimal key-value contract the core reads from and writes to.
///
/// A `set` replaces the whole value for a key atomically.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// `{profile}_study_targets`
pub fn targets_key(profile: &str) -> String {
    format!("{profile}_study_targets")
}

/// `{profile}_progress_{YYYY-MM-DD}`
pub fn progress_key(profile: &str, date: NaiveDate) -> String {
    format!("{profile}_progress_{}", date.format("%Y-%m-%d"))
}

/// Read and decode the JSON document stored under `key`.
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYTRACK_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/studytrack`, or `~/.config/studytrack-dev` when
/// `STUDYTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYTRACK_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studytrack-dev")
            } else {
                base_dir.join("studytrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
