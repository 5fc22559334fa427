use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};

use super::{PersistenceStore, SetOptions, StoredEntry};
use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;

/// One JSON envelope file per key under `data_dir`.
pub struct FileStore {
    data_dir: PathBuf,
    clock: Rc<dyn Clock>,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            clock: Rc::new(SystemClock),
        })
    }

    /// `$HANGWORD_DATA_DIR`, else the platform data dir, else the temp dir.
    pub fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("HANGWORD_DATA_DIR") {
            return PathBuf::from(dir);
        }
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("hangword")
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("{file_name}.json"))
    }

    fn read_entry(&self, path: &Path) -> Option<StoredEntry> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<StoredEntry>(&contents) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(target: "storage", "Removing unreadable entry {:?}: {}", path, err);
                let _ = fs::remove_file(path);
                None
            }
        }
    }
}

impl PersistenceStore for FileStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let entry = self.read_entry(&path)?;
        if entry.is_expired(self.clock.now()) {
            debug!(target: "storage", "Entry '{}' expired", key);
            let _ = fs::remove_file(&path);
            return None;
        }
        Some(entry.value)
    }

    fn set(&mut self, key: &str, value: &str, options: SetOptions) -> Result<(), StorageError> {
        let entry = StoredEntry {
            value: value.to_string(),
            written_at: self.clock.now(),
            expires_at: options.expiration,
            metadata: options.metadata,
        };
        let contents = serde_json::to_string_pretty(&entry).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        fs::write(self.entry_path(key), contents)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> bool {
        fs::remove_file(self.entry_path(key)).is_ok()
    }

    fn evict_oldest(&mut self, protected: &[&str]) -> Option<String> {
        let protected_paths: Vec<PathBuf> = protected.iter().map(|k| self.entry_path(k)).collect();
        let oldest = fs::read_dir(&self.data_dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|dir_entry| dir_entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter(|path| !protected_paths.contains(path))
            .filter_map(|path| self.read_entry(&path).map(|entry| (entry.written_at, path)))
            .min_by_key(|(written_at, _)| *written_at)?;
        let (_, path) = oldest;
        fs::remove_file(&path).ok()?;
        path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serial_test::serial;
    use std::time::{Duration, SystemTime};

    fn store_in(dir: &Path) -> (FileStore, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000),
        ));
        let store = FileStore::new(dir).unwrap().with_clock(clock.clone());
        (store, clock)
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, _) = store_in(dir.path());
        store
            .set("statistics", r#"{"games_played":1}"#, SetOptions::default())
            .unwrap();
        assert!(dir.path().join("statistics.json").exists());

        let (mut reopened, _) = store_in(dir.path());
        assert_eq!(
            reopened.get("statistics").as_deref(),
            Some(r#"{"games_played":1}"#)
        );
        assert!(reopened.delete("statistics"));
        assert!(!reopened.has("statistics"));
    }

    #[test]
    fn test_corrupted_envelope_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, _) = store_in(dir.path());
        fs::write(dir.path().join("achievements.json"), "garbage").unwrap();
        assert_eq!(store.get("achievements"), None);
        assert!(!dir.path().join("achievements.json").exists());
    }

    #[test]
    fn test_evicts_oldest_unprotected_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, clock) = store_in(dir.path());
        store.set("old_cache", "1", SetOptions::default()).unwrap();
        clock.advance(Duration::from_secs(1));
        store.set("statistics", "2", SetOptions::default()).unwrap();
        clock.advance(Duration::from_secs(1));
        store.set("new_cache", "3", SetOptions::default()).unwrap();

        assert_eq!(store.evict_oldest(&["statistics"]), Some("old_cache".to_string()));
        assert_eq!(store.evict_oldest(&["statistics"]), Some("new_cache".to_string()));
        assert_eq!(store.evict_oldest(&["statistics"]), None);
    }

    #[test]
    #[serial]
    fn test_data_dir_env_override() {
        std::env::set_var("HANGWORD_DATA_DIR", "/tmp/hangword-test");
        assert_eq!(FileStore::default_data_dir(), PathBuf::from("/tmp/hangword-test"));
        std::env::remove_var("HANGWORD_DATA_DIR");
        let dir = FileStore::default_data_dir();
        assert!(dir.ends_with("hangword"));
        assert!(dir.is_absolute());
    }
}
