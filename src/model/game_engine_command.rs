use std::time::Duration;

use super::{Difficulty, PracticeConfig};

/// Everything the presentation layer may ask of the engine.
#[derive(Debug, Clone)]
pub enum GameEngineCommand {
    Guess(String),
    Hint,
    Pause,
    Resume,
    Reset,
    Quit,
    /// Drive scheduled work (countdown, auto-continue) up to the clock's now.
    Tick,
    SetDifficulty(Difficulty),
    SetCategory(String),
    EnablePracticeMode(PracticeConfig),
    EnableTimedMode(Duration),
    EnableMultiplayerMode {
        players: Vec<String>,
        total_rounds: Option<u32>,
    },
    DisableMode,
    ResetAchievements,
    ResetStatistics,
}
