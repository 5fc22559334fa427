use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DurationMilliSeconds;

use crate::error::StorageError;
use crate::game::game_state::{DEFAULT_MAX_INCORRECT, MAX_INCORRECT_LIMIT};
use crate::model::Difficulty;
use crate::storage::{self, PersistenceStore, SetOptions, SETTINGS_KEY};

const CURRENT_VERSION: u32 = 2;

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_max_incorrect")]
    pub max_incorrect: u32,

    /// Delay before endless practice starts the next round.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_auto_continue_delay")]
    pub auto_continue_delay: Duration,

    /// Delay before multiplayer hands the next round to the next player.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_auto_advance_delay")]
    pub auto_advance_delay: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_time_limit")]
    pub default_time_limit: Duration,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_category() -> String {
    "animals".to_string()
}
fn default_max_incorrect() -> u32 {
    DEFAULT_MAX_INCORRECT
}
fn default_auto_continue_delay() -> Duration {
    Duration::from_millis(1500)
}
fn default_auto_advance_delay() -> Duration {
    Duration::from_millis(2000)
}
fn default_time_limit() -> Duration {
    Duration::from_millis(60_000)
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            difficulty: Difficulty::default(),
            category: default_category(),
            max_incorrect: default_max_incorrect(),
            auto_continue_delay: default_auto_continue_delay(),
            auto_advance_delay: default_auto_advance_delay(),
            default_time_limit: default_time_limit(),
        }
    }
}

impl Settings {
    /// Missing or unreadable settings fall back to defaults, which are written
    /// back so the next start finds them. The settings are usable even when
    /// that write fails; the second half of the pair reports it.
    pub fn load(store: &mut dyn PersistenceStore) -> (Self, Result<(), StorageError>) {
        match storage::load_json(store, SETTINGS_KEY, Settings::validate) {
            Ok(Some(mut settings)) => {
                let saved = if settings.migrate() {
                    settings.save(store)
                } else {
                    Ok(())
                };
                return (settings, saved);
            }
            Ok(None) => {}
            Err(err) => warn!(target: "settings", "Resetting settings: {}", err),
        }
        let default = Settings::default();
        let saved = default.save(store);
        (default, saved)
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) -> Result<(), StorageError> {
        storage::save_json(store, SETTINGS_KEY, self, SetOptions::default())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_incorrect == 0 {
            return Err("max_incorrect must be at least 1".to_string());
        }
        if self.max_incorrect > MAX_INCORRECT_LIMIT {
            return Err(format!("max_incorrect must be at most {}", MAX_INCORRECT_LIMIT));
        }
        if self.default_time_limit.is_zero() {
            return Err("default_time_limit must be positive".to_string());
        }
        Ok(())
    }

    /// Returns true when anything changed.
    fn migrate(&mut self) -> bool {
        let before = self.version;
        loop {
            match self.version {
                0 => {
                    self.version = 1;
                }
                // version 1 stored "moderate" which now reads as medium; the
                // category field arrived with version 2
                1 => {
                    if self.category.trim().is_empty() {
                        self.category = default_category();
                    }
                    self.version = 2;
                }
                _ => break,
            }
        }
        self.version != before
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok()?.trim().parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serial_test::serial;

    #[test]
    fn test_cold_start_writes_defaults() {
        let mut store = MemoryStore::new();
        let (settings, saved) = Settings::load(&mut store);
        assert!(saved.is_ok());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_incorrect, 6);
        assert_eq!(settings.auto_continue_delay, Duration::from_millis(1500));
        assert!(store.has(SETTINGS_KEY));
    }

    #[test]
    fn test_migrates_version_one() {
        let mut store = MemoryStore::new();
        store
            .set(SETTINGS_KEY, r#"{"version": 1, "difficulty": "moderate"}"#, SetOptions::default())
            .unwrap();
        let (settings, _) = Settings::load(&mut store);
        assert_eq!(settings.version(), CURRENT_VERSION);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.category, "animals");
        assert_eq!(settings.default_time_limit, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_settings_reset() {
        let mut store = MemoryStore::new();
        store
            .set(SETTINGS_KEY, r#"{"version": 2, "max_incorrect": 0}"#, SetOptions::default())
            .unwrap();
        assert_eq!(Settings::load(&mut store).0.max_incorrect, 6);

        store
            .set(SETTINGS_KEY, r#"{"version": 2, "max_incorrect": 4000000000}"#, SetOptions::default())
            .unwrap();
        assert_eq!(Settings::load(&mut store).0.max_incorrect, 6);
    }

    #[test]
    fn test_failed_default_write_is_reported() {
        let mut store = MemoryStore::with_quota(16);
        let (settings, saved) = Settings::load(&mut store);
        assert_eq!(settings, Settings::default());
        assert!(saved.is_err());
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "42");
        assert_eq!(Settings::seed_from_env(), Some(42));
        std::env::set_var("SEED", "not a number");
        assert_eq!(Settings::seed_from_env(), None);
        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }
}
