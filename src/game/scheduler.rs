use std::time::{Duration, SystemTime};

use log::trace;
use uuid::Uuid;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Timed mode countdown step.
    CountdownTick,
    /// Endless practice: start the next round if `round_id` is still current.
    AutoContinue { round_id: Uuid },
    /// Multiplayer: hand over to the next player if `round_id` is still current.
    AutoAdvance { round_id: Uuid },
}

#[derive(Debug)]
struct Entry {
    handle: TaskHandle,
    task: ScheduledTask,
    due: SystemTime,
    interval: Option<Duration>,
}

/// Cooperative timer queue. Nothing fires on its own; the owner drains due
/// tasks with `pop_due` whenever it is ticked.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, now: SystemTime, delay: Duration, task: ScheduledTask) -> TaskHandle {
        self.push(now + delay, None, task)
    }

    pub fn schedule_repeating(
        &mut self,
        now: SystemTime,
        interval: Duration,
        task: ScheduledTask,
    ) -> TaskHandle {
        let interval = interval.max(MIN_INTERVAL);
        self.push(now + interval, Some(interval), task)
    }

    fn push(&mut self, due: SystemTime, interval: Option<Duration>, task: ScheduledTask) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        trace!(target: "scheduler", "Scheduled {:?} as {:?}", task, handle);
        self.entries.push(Entry {
            handle,
            task,
            due,
            interval,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        let cancelled = self.entries.len() != before;
        if cancelled {
            trace!(target: "scheduler", "Cancelled {:?}", handle);
        }
        cancelled
    }

    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            trace!(target: "scheduler", "Cancelled {} tasks", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_due(&self) -> Option<SystemTime> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Takes the earliest task due at `now`. Repeating tasks stay queued for
    /// their next interval, so a late caller sees every missed repetition.
    pub fn pop_due(&mut self, now: SystemTime) -> Option<(TaskHandle, ScheduledTask)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.handle))
            .map(|(index, _)| index)?;
        let entry = &mut self.entries[index];
        let fired = (entry.handle, entry.task);
        if let Some(interval) = entry.interval {
            entry.due += interval;
        } else {
            self.entries.remove(index);
        }
        Some(fired)
    }
}
