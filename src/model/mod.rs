mod achievement;
mod difficulty;
mod game_engine_command;
mod game_engine_event;
pub mod game_state_snapshot;
mod game_stats;
mod mode_config;
mod round_projection;
mod round_status;
mod timer_state;
mod word_catalog;

pub use achievement::{AchievementKind, AchievementSet, AchievementStatus};
pub use difficulty::{Difficulty, UnknownDifficulty};
pub use game_engine_command::GameEngineCommand;
pub use game_engine_event::{GameEngineEvent, RoundSummary};
pub use game_state_snapshot::GameStateSnapshot;
pub use game_stats::{
    BreakdownStats, DailyStats, GameStats, GlobalStats, Insights, PerformanceMetrics,
    PeriodRollup, HISTORY_CAPACITY,
};
pub use mode_config::{
    LengthFilter, ModeKind, Player, PracticeConfig, SessionSummary,
};
pub use round_projection::RoundProjection;
pub use round_status::RoundStatus;
pub use timer_state::TimerState;
pub use word_catalog::{CatalogTiers, WordCatalog};
