use std::time::{Duration, SystemTime};

use log::info;

use crate::error::{DataError, StorageError};
use crate::model::{AchievementKind, AchievementSet, Difficulty};
use crate::storage::{self, PersistenceStore, SetOptions, ACHIEVEMENTS_KEY};

const SPEED_DEMON_LIMIT: Duration = Duration::from_millis(15_000);
const CATEGORY_EXPLORER_COUNT: usize = 5;
const SCORE_HUNTER_POINTS: u64 = 1_000;

/// What the predicates look at: the just-won round plus statistics as they
/// stand once that round is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementContext {
    pub games_won: u32,
    pub current_streak: u32,
    pub incorrect_guesses: u32,
    pub completion_time: Duration,
    pub difficulty: Difficulty,
    pub categories_played: usize,
    pub total_score: u64,
}

impl AchievementKind {
    pub fn is_earned(&self, ctx: &AchievementContext) -> bool {
        match self {
            AchievementKind::FirstWin => ctx.games_won >= 1,
            AchievementKind::Streak5 => ctx.current_streak >= 5,
            AchievementKind::Streak10 => ctx.current_streak >= 10,
            AchievementKind::PerfectGame => ctx.incorrect_guesses == 0,
            AchievementKind::SpeedDemon => ctx.completion_time < SPEED_DEMON_LIMIT,
            AchievementKind::DifficultyMaster => ctx.difficulty == Difficulty::Hard,
            AchievementKind::CategoryExplorer => ctx.categories_played >= CATEGORY_EXPLORER_COUNT,
            AchievementKind::ScoreHunter => ctx.total_score >= SCORE_HUNTER_POINTS,
        }
    }
}

#[derive(Debug, Default)]
pub struct AchievementTracker {
    achievements: AchievementSet,
}

impl AchievementTracker {
    /// Corrupted data is discarded and reported; the tracker starts clean.
    pub fn load(store: &mut dyn PersistenceStore) -> (Self, Option<DataError>) {
        match storage::load_json(store, ACHIEVEMENTS_KEY, AchievementSet::validate) {
            Ok(Some(achievements)) => (Self { achievements }, None),
            Ok(None) => (Self::default(), None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) -> Result<(), StorageError> {
        storage::save_json_with_recovery(
            store,
            ACHIEVEMENTS_KEY,
            &self.achievements,
            SetOptions::with_metadata("unlocked", &self.achievements.unlocked_count().to_string()),
        )
    }

    pub fn achievements(&self) -> &AchievementSet {
        &self.achievements
    }

    /// Unlocks whatever the context now satisfies. Returns only the new ones.
    pub fn evaluate(&mut self, ctx: &AchievementContext, now: SystemTime) -> Vec<AchievementKind> {
        let mut newly_unlocked = Vec::new();
        for kind in AchievementKind::all() {
            if kind.is_earned(ctx) && self.achievements.unlock(kind, now) {
                info!(target: "achievements", "Unlocked {} ({})", kind.title(), kind.description());
                newly_unlocked.push(kind);
            }
        }
        newly_unlocked
    }

    pub fn reset(&mut self) {
        self.achievements = AchievementSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn first_win() -> AchievementContext {
        AchievementContext {
            games_won: 1,
            current_streak: 1,
            incorrect_guesses: 2,
            completion_time: Duration::from_secs(40),
            difficulty: Difficulty::Easy,
            categories_played: 1,
            total_score: 150,
        }
    }

    #[test]
    fn test_first_win_unlocks_once() {
        let mut tracker = AchievementTracker::default();
        let now = SystemTime::UNIX_EPOCH;
        assert_eq!(tracker.evaluate(&first_win(), now), vec![AchievementKind::FirstWin]);
        assert!(tracker.evaluate(&first_win(), now).is_empty());
    }

    #[test]
    fn test_all_predicates() {
        let mut tracker = AchievementTracker::default();
        let ctx = AchievementContext {
            games_won: 12,
            current_streak: 10,
            incorrect_guesses: 0,
            completion_time: Duration::from_millis(14_999),
            difficulty: Difficulty::Hard,
            categories_played: 5,
            total_score: 1_000,
        };
        let unlocked = tracker.evaluate(&ctx, SystemTime::UNIX_EPOCH);
        assert_eq!(unlocked, AchievementKind::all().to_vec());
    }

    #[test]
    fn test_speed_demon_boundary_is_exclusive() {
        let mut ctx = first_win();
        ctx.completion_time = Duration::from_millis(15_000);
        assert!(!AchievementKind::SpeedDemon.is_earned(&ctx));
    }

    #[test]
    fn test_unlocks_survive_save_and_load() {
        let mut store = MemoryStore::new();
        let mut tracker = AchievementTracker::default();
        tracker.evaluate(&first_win(), SystemTime::UNIX_EPOCH);
        tracker.save(&mut store).unwrap();

        let (loaded, repair) = AchievementTracker::load(&mut store);
        assert!(repair.is_none());
        assert!(loaded.achievements().is_unlocked(AchievementKind::FirstWin));
        assert!(!loaded.achievements().is_unlocked(AchievementKind::Streak5));
    }

    #[test]
    fn test_corrupted_achievements_reset_to_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(ACHIEVEMENTS_KEY, r#"{"entries": 7}"#, SetOptions::default())
            .unwrap();
        let (loaded, repair) = AchievementTracker::load(&mut store);
        assert!(matches!(repair, Some(DataError::Parse { .. })));
        assert_eq!(loaded.achievements().unlocked_count(), 0);
    }
}
