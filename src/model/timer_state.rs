use std::time::{Duration, SystemTime};

use serde_with::serde_as;
use serde_with::{DurationMilliSeconds, TimestampMilliSeconds};

/// Wall-clock bookkeeping for one round. Paused spans are excluded from
/// `elapsed`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub paused_timestamp: Option<SystemTime>,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub paused_duration: Duration,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub started_timestamp: SystemTime,
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    pub ended_timestamp: Option<SystemTime>,
}

impl TimerState {
    pub fn started_at(now: SystemTime) -> Self {
        Self {
            paused_timestamp: None,
            paused_duration: Duration::ZERO,
            started_timestamp: now,
            ended_timestamp: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_timestamp.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_timestamp.is_some()
    }

    pub fn elapsed(&self, now: SystemTime) -> Duration {
        let until_time = self
            .ended_timestamp
            .or(self.paused_timestamp)
            .unwrap_or(now);

        until_time
            .duration_since(self.started_timestamp)
            .unwrap_or_default()
            .saturating_sub(self.paused_duration)
    }

    pub fn paused(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        if new_state.paused_timestamp.is_none() && new_state.ended_timestamp.is_none() {
            new_state.paused_timestamp = Some(now);
        }
        new_state
    }

    pub fn resumed(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        if let Some(pause_time) = new_state.paused_timestamp.take() {
            new_state.paused_duration = new_state
                .paused_duration
                .saturating_add(now.duration_since(pause_time).unwrap_or_default());
        }
        new_state
    }

    /// Ending while paused folds the open pause span in first.
    pub fn ended(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.resumed(now);
        if new_state.ended_timestamp.is_none() {
            new_state.ended_timestamp = Some(now);
        }
        new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_elapsed_with_pause() {
        let now = t0();
        let timer = TimerState::started_at(now).paused(now + Duration::from_secs(5));

        assert_eq!(
            timer.elapsed(now + Duration::from_secs(60)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_elapsed_with_end() {
        let now = t0();
        let timer = TimerState::started_at(now).ended(now + Duration::from_secs(10));

        assert_eq!(
            timer.elapsed(now + Duration::from_secs(99)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_resume_accumulates_paused_span() {
        let now = t0();
        let timer = TimerState::started_at(now)
            .paused(now + Duration::from_secs(4))
            .resumed(now + Duration::from_secs(7));

        assert_eq!(timer.paused_duration, Duration::from_secs(3));
        assert_eq!(
            timer.elapsed(now + Duration::from_secs(10)),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_end_while_paused_excludes_pause() {
        let now = t0();
        let timer = TimerState::started_at(now)
            .paused(now + Duration::from_secs(2))
            .ended(now + Duration::from_secs(30));

        assert_eq!(timer.elapsed(now + Duration::from_secs(40)), Duration::from_secs(2));
    }
}
