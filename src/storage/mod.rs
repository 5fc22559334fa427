//! Key-value persistence port. The engine only sees `PersistenceStore`;
//! values are JSON strings wrapped in an envelope carrying write time,
//! optional expiry and free-form metadata.

mod file_store;
mod memory_store;

use std::collections::BTreeMap;
use std::time::SystemTime;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampMilliSeconds;

use crate::error::{DataError, StorageError};

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

pub const SETTINGS_KEY: &str = "settings";
pub const STATISTICS_KEY: &str = "statistics";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const BEST_TIMES_KEY: &str = "timed_best_times";

/// Keys the engine never evicts to make room.
pub const PROTECTED_KEYS: [&str; 3] = [STATISTICS_KEY, ACHIEVEMENTS_KEY, SETTINGS_KEY];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub expiration: Option<SystemTime>,
    pub metadata: BTreeMap<String, String>,
}

impl SetOptions {
    pub fn with_metadata(key: &str, value: &str) -> Self {
        let mut options = Self::default();
        options.metadata.insert(key.to_string(), value.to_string());
        options
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub written_at: SystemTime,
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    #[serde(default)]
    pub expires_at: Option<SystemTime>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl StoredEntry {
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

pub trait PersistenceStore {
    /// Missing and expired keys both read as `None`.
    fn get(&mut self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str, options: SetOptions) -> Result<(), StorageError>;

    fn delete(&mut self, key: &str) -> bool;

    fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Drops the least recently written key not listed in `protected`.
    fn evict_oldest(&mut self, _protected: &[&str]) -> Option<String> {
        None
    }
}

/// Reads and validates a typed value. Corrupted entries are deleted and
/// reported so the caller can fall back to defaults.
pub fn load_json<T, F>(
    store: &mut dyn PersistenceStore,
    key: &str,
    validate: F,
) -> Result<Option<T>, DataError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), String>,
{
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };
    let parsed = serde_json::from_str::<T>(&raw).map_err(|e| DataError::Parse {
        key: key.to_string(),
        message: e.to_string(),
    });
    let error = match parsed {
        Ok(value) => match validate(&value) {
            Ok(()) => return Ok(Some(value)),
            Err(reason) => DataError::Invalid {
                key: key.to_string(),
                reason,
            },
        },
        Err(err) => err,
    };
    warn!(target: "storage", "Discarding corrupted entry '{}': {}", key, error);
    store.delete(key);
    Err(error)
}

pub fn save_json<T: Serialize>(
    store: &mut dyn PersistenceStore,
    key: &str,
    value: &T,
    options: SetOptions,
) -> Result<(), StorageError> {
    let contents = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &contents, options)
}

/// `save_json`, retrying once after evicting the oldest unprotected entry
/// when the store is full.
pub fn save_json_with_recovery<T: Serialize>(
    store: &mut dyn PersistenceStore,
    key: &str,
    value: &T,
    options: SetOptions,
) -> Result<(), StorageError> {
    match save_json(store, key, value, options.clone()) {
        Err(err @ StorageError::QuotaExceeded { .. }) => {
            let mut protected: Vec<&str> = PROTECTED_KEYS.to_vec();
            protected.push(key);
            match store.evict_oldest(&protected) {
                Some(evicted) => {
                    warn!(target: "storage", "Store full, evicted '{}' to save '{}'", evicted, key);
                    save_json(store, key, value, options)
                }
                None => Err(err),
            }
        }
        other => other,
    }
}
