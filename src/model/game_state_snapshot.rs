use std::time::Duration;

use uuid::Uuid;

use super::{Difficulty, ModeKind, RoundStatus};

/// Read-only view of the active round handed to the presentation layer.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStateSnapshot {
    pub playthrough_id: Uuid,
    /// `_` for hidden letters, spaces preserved
    pub masked_word: String,
    /// Only filled in once the round is over.
    pub word: Option<String>,
    pub difficulty: Difficulty,
    pub category: String,
    pub mode: ModeKind,
    pub status: RoundStatus,
    pub guessed_letters: Vec<char>,
    pub incorrect_guesses: Vec<char>,
    pub max_incorrect: u32,
    pub hints_used: u32,
    pub elapsed: Duration,
    pub time_remaining: Option<Duration>,
    pub current_player: Option<String>,
}

impl GameStateSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        playthrough_id: Uuid,
        masked_word: String,
        word: Option<String>,
        difficulty: Difficulty,
        category: String,
        mode: ModeKind,
        status: RoundStatus,
        guessed_letters: Vec<char>,
        incorrect_guesses: Vec<char>,
        max_incorrect: u32,
        hints_used: u32,
        elapsed: Duration,
        time_remaining: Option<Duration>,
        current_player: Option<String>,
    ) -> Self {
        Self {
            playthrough_id,
            masked_word,
            word,
            difficulty,
            category,
            mode,
            status,
            guessed_letters,
            incorrect_guesses,
            max_incorrect,
            hints_used,
            elapsed,
            time_remaining,
            current_player,
        }
    }

    pub fn remaining_mistakes(&self) -> u32 {
        self.max_incorrect
            .saturating_sub(self.incorrect_guesses.len() as u32)
    }
}
