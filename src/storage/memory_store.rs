use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use super::{PersistenceStore, SetOptions, StoredEntry};
use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;

/// In-memory store with an optional byte quota (key + value lengths).
pub struct MemoryStore {
    entries: HashMap<String, (u64, StoredEntry)>,
    quota: Option<usize>,
    write_seq: u64,
    clock: Rc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            quota: None,
            write_seq: 0,
            clock: Rc::new(SystemClock),
        }
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::new()
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, (_, entry))| key.len() + entry.value.len())
            .sum()
    }

    pub fn entry(&self, key: &str) -> Option<&StoredEntry> {
        self.entries.get(key).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some((_, entry)) if entry.is_expired(now) => true,
            Some((_, entry)) => return Some(entry.value.clone()),
            None => return None,
        };
        if expired {
            debug!(target: "storage", "Entry '{}' expired", key);
            self.entries.remove(key);
        }
        None
    }

    fn set(&mut self, key: &str, value: &str, options: SetOptions) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let existing = self
                .entries
                .get(key)
                .map(|(_, e)| key.len() + e.value.len())
                .unwrap_or(0);
            let used = self.used_bytes() - existing;
            let needed = key.len() + value.len();
            if used + needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available: quota.saturating_sub(used),
                });
            }
        }
        self.write_seq += 1;
        trace!(target: "storage", "set '{}' ({} bytes)", key, value.len());
        self.entries.insert(
            key.to_string(),
            (
                self.write_seq,
                StoredEntry {
                    value: value.to_string(),
                    written_at: self.clock.now(),
                    expires_at: options.expiration,
                    metadata: options.metadata,
                },
            ),
        );
        Ok(())
    }

    fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn evict_oldest(&mut self, protected: &[&str]) -> Option<String> {
        let oldest = self
            .entries
            .iter()
            .filter(|(key, _)| !protected.contains(&key.as_str()))
            .min_by_key(|(_, (seq, _))| *seq)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&oldest);
        Some(oldest)
    }
}
