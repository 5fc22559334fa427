use std::time::Duration;

use super::{AchievementKind, Difficulty, GameStateSnapshot, ModeKind, RoundStatus, SessionSummary};
use crate::error::{DataError, InputError, SelectionError, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub status: RoundStatus,
    pub word: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub score: u32,
    pub newly_unlocked: Vec<AchievementKind>,
    /// Tier the next round will use, when this win earned a promotion.
    pub promoted_to: Option<Difficulty>,
    pub completion_time: Duration,
}

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    RoundStarted(GameStateSnapshot),
    RoundUpdated(GameStateSnapshot),
    GuessRejected(InputError),
    RoundFinished(RoundSummary),
    TimerTick { remaining: Duration },
    DifficultyChanged(Difficulty),
    CategoryChanged(String),
    ModeChanged(ModeKind),
    PlayerTurn { index: usize, name: String },
    SessionEnded(SessionSummary),
    SelectionFailed(SelectionError),
    OfflineModeChanged(bool),
    PersistenceDegraded(StorageError),
    DataRepaired(DataError),
    AchievementsReset,
    StatisticsReset,
}
