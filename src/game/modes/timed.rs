use std::collections::BTreeMap;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DurationMilliSeconds;

use crate::error::{DataError, StorageError};
use crate::game::scheduler::TaskHandle;
use crate::game::word_selector::seen_key;
use crate::model::Difficulty;
use crate::storage::{self, PersistenceStore, SetOptions, BEST_TIMES_KEY};

pub const COUNTDOWN_INTERVAL: Duration = Duration::from_millis(100);

/// Fastest winning time per `difficulty-category`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestTimes(#[serde_as(as = "BTreeMap<_, DurationMilliSeconds<u64>>")] BTreeMap<String, Duration>);

impl BestTimes {
    pub fn get(&self, difficulty: Difficulty, category: &str) -> Option<Duration> {
        self.0.get(&seen_key(difficulty, category)).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug)]
pub struct TimedState {
    time_limit: Duration,
    time_remaining: Duration,
    best_times: BestTimes,
    pub(crate) countdown: Option<TaskHandle>,
}

impl TimedState {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            time_remaining: time_limit,
            best_times: BestTimes::default(),
            countdown: None,
        }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    pub fn time_used(&self) -> Duration {
        self.time_limit.saturating_sub(self.time_remaining)
    }

    pub fn best_times(&self) -> &BestTimes {
        &self.best_times
    }

    pub fn restart(&mut self) {
        self.time_remaining = self.time_limit;
    }

    /// Counts down one step. Returns true once the clock is at zero.
    pub fn tick(&mut self, step: Duration) -> bool {
        self.time_remaining = self.time_remaining.saturating_sub(step);
        self.time_remaining.is_zero()
    }

    /// Returns true when `time` beats the stored best.
    pub fn record_win(&mut self, difficulty: Difficulty, category: &str, time: Duration) -> bool {
        let key = seen_key(difficulty, category);
        let improved = self.best_times.0.get(&key).map_or(true, |best| time < *best);
        if improved {
            info!(target: "timed", "New best time for {}: {} ms", key, time.as_millis());
            self.best_times.0.insert(key, time);
        }
        improved
    }

    pub fn load_best_times(&mut self, store: &mut dyn PersistenceStore) -> Option<DataError> {
        match storage::load_json(store, BEST_TIMES_KEY, |_: &BestTimes| Ok(())) {
            Ok(Some(best_times)) => {
                self.best_times = best_times;
                None
            }
            Ok(None) => None,
            Err(err) => Some(err),
        }
    }

    pub fn save_best_times(&self, store: &mut dyn PersistenceStore) -> Result<(), StorageError> {
        storage::save_json_with_recovery(store, BEST_TIMES_KEY, &self.best_times, SetOptions::default())
    }
}
