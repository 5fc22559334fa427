use std::collections::BTreeSet;
use std::time::{Duration, SystemTime};

use log::{debug, trace};
use uuid::Uuid;

use crate::error::{GuessError, InputError};
use crate::helpers::fold_letter;
use crate::model::{Difficulty, RoundStatus, TimerState};

pub const DEFAULT_MAX_INCORRECT: u32 = 6;
/// No round can take more misses than there are letters to guess.
pub const MAX_INCORRECT_LIMIT: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Hit { positions: usize },
    Miss { remaining: u32 },
    AlreadyGuessed,
    Won,
    Lost,
}

impl GuessOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuessOutcome::Won | GuessOutcome::Lost)
    }
}

/// Normalizes raw input to a single `a`-`z` letter.
pub fn validate_letter(input: &str) -> Result<char, InputError> {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return Err(InputError::Empty);
    };
    // a base letter followed only by combining accents is still one letter
    let rest_is_accents = chars.all(|c| ('\u{0300}'..='\u{036f}').contains(&c));
    if !rest_is_accents {
        return Err(InputError::MultiCharacter);
    }
    if first.is_ascii_digit() || first.is_numeric() {
        return Err(InputError::Digit);
    }
    if first.is_ascii_punctuation() || (!first.is_alphanumeric() && !first.is_whitespace()) {
        return Err(InputError::Punctuation);
    }
    let folded = fold_letter(first);
    if folded.is_ascii_lowercase() {
        Ok(folded)
    } else {
        Err(InputError::NotAlphabetic)
    }
}

/// One round: the hidden word, what has been guessed, and where it stands.
#[derive(Debug, Clone)]
pub struct GameState {
    playthrough_id: Uuid,
    word: String,
    folded: Vec<char>,
    revealed: Vec<bool>,
    guessed_letters: BTreeSet<char>,
    incorrect_guesses: Vec<char>,
    correct_guesses: u32,
    max_incorrect: u32,
    status: RoundStatus,
    timer_state: TimerState,
    difficulty: Difficulty,
    category: String,
    hints_used: u32,
}

impl GameState {
    pub fn new(
        playthrough_id: Uuid,
        word: &str,
        difficulty: Difficulty,
        category: &str,
        max_incorrect: u32,
        now: SystemTime,
    ) -> Self {
        let word = word.trim().to_lowercase();
        let folded: Vec<char> = word.chars().map(fold_letter).collect();
        let revealed = folded.iter().map(|c| *c == ' ').collect();
        trace!(target: "game_state", "New round {} ({}/{})", playthrough_id, difficulty, category);
        Self {
            playthrough_id,
            word,
            folded,
            revealed,
            guessed_letters: BTreeSet::new(),
            incorrect_guesses: Vec::new(),
            correct_guesses: 0,
            max_incorrect: max_incorrect.max(1),
            status: RoundStatus::Playing,
            timer_state: TimerState::started_at(now),
            difficulty,
            category: category.to_string(),
            hints_used: 0,
        }
    }

    pub fn playthrough_id(&self) -> Uuid {
        self.playthrough_id
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn max_incorrect(&self) -> u32 {
        self.max_incorrect
    }

    pub fn guessed_letters(&self) -> &BTreeSet<char> {
        &self.guessed_letters
    }

    pub fn incorrect_guesses(&self) -> &[char] {
        &self.incorrect_guesses
    }

    pub fn incorrect_count(&self) -> u32 {
        self.incorrect_guesses.len() as u32
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_guesses
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn timer_state(&self) -> &TimerState {
        &self.timer_state
    }

    pub fn elapsed(&self, now: SystemTime) -> Duration {
        self.timer_state.elapsed(now)
    }

    pub fn remaining_mistakes(&self) -> u32 {
        self.max_incorrect.saturating_sub(self.incorrect_count())
    }

    pub fn masked_word(&self) -> String {
        self.word
            .chars()
            .zip(&self.revealed)
            .map(|(c, shown)| if *shown { c } else { '_' })
            .collect()
    }

    /// Distinct letters still hidden, alphabetical.
    pub fn hidden_letters(&self) -> Vec<char> {
        self.folded
            .iter()
            .zip(&self.revealed)
            .filter(|(_, shown)| !**shown)
            .map(|(c, _)| *c)
            .collect::<BTreeSet<char>>()
            .into_iter()
            .collect()
    }

    pub fn is_solved(&self) -> bool {
        self.revealed.iter().all(|shown| *shown)
    }

    pub fn guess(&mut self, input: &str, now: SystemTime) -> Result<GuessOutcome, GuessError> {
        if self.status != RoundStatus::Playing {
            return Err(GuessError::NotPlaying(self.status));
        }
        let letter = validate_letter(input)?;
        if !self.guessed_letters.insert(letter) {
            return Ok(GuessOutcome::AlreadyGuessed);
        }

        let mut positions = 0;
        for (c, shown) in self.folded.iter().zip(self.revealed.iter_mut()) {
            if *c == letter {
                *shown = true;
                positions += 1;
            }
        }

        if positions > 0 {
            self.correct_guesses += 1;
            if self.is_solved() {
                self.finish(RoundStatus::Won, now);
                return Ok(GuessOutcome::Won);
            }
            Ok(GuessOutcome::Hit { positions })
        } else {
            self.incorrect_guesses.push(letter);
            if self.incorrect_count() >= self.max_incorrect {
                self.finish(RoundStatus::Lost, now);
                return Ok(GuessOutcome::Lost);
            }
            Ok(GuessOutcome::Miss {
                remaining: self.remaining_mistakes(),
            })
        }
    }

    /// Reveals `letter` as a hint. The guess is counted like any other.
    pub fn hint(&mut self, letter: char, now: SystemTime) -> Result<GuessOutcome, GuessError> {
        let outcome = self.guess(&letter.to_string(), now)?;
        self.hints_used += 1;
        Ok(outcome)
    }

    pub fn pause(&mut self, now: SystemTime) -> bool {
        if self.status != RoundStatus::Playing {
            return false;
        }
        self.status = RoundStatus::Paused;
        self.timer_state = self.timer_state.paused(now);
        true
    }

    pub fn resume(&mut self, now: SystemTime) -> bool {
        if self.status != RoundStatus::Paused {
            return false;
        }
        self.status = RoundStatus::Playing;
        self.timer_state = self.timer_state.resumed(now);
        true
    }

    pub fn quit(&mut self, now: SystemTime) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.finish(RoundStatus::Quit, now);
        true
    }

    /// Ends a round that ran out of time.
    pub fn expire(&mut self, now: SystemTime) -> bool {
        if self.status != RoundStatus::Playing {
            return false;
        }
        self.finish(RoundStatus::Lost, now);
        true
    }

    fn finish(&mut self, status: RoundStatus, now: SystemTime) {
        debug!(target: "game_state", "Round {} finished: {:?}", self.playthrough_id, status);
        self.status = status;
        self.timer_state = self.timer_state.ended(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn round(word: &str) -> GameState {
        GameState::new(
            Uuid::new_v4(),
            word,
            Difficulty::Easy,
            "animals",
            DEFAULT_MAX_INCORRECT,
            t0(),
        )
    }

    fn assert_invariants(state: &GameState) {
        for letter in state.incorrect_guesses() {
            assert!(state.guessed_letters().contains(letter));
        }
        if state.status() == RoundStatus::Playing {
            assert!(state.incorrect_count() <= state.max_incorrect());
        }
    }

    #[test]
    fn test_validate_letter_reasons() {
        assert_eq!(validate_letter("A"), Ok('a'));
        assert_eq!(validate_letter(" é "), Ok('e'));
        assert_eq!(validate_letter("e\u{0301}"), Ok('e'));
        assert_eq!(validate_letter(""), Err(InputError::Empty));
        assert_eq!(validate_letter("   "), Err(InputError::Empty));
        assert_eq!(validate_letter("7"), Err(InputError::Digit));
        assert_eq!(validate_letter("!"), Err(InputError::Punctuation));
        assert_eq!(validate_letter("ab"), Err(InputError::MultiCharacter));
        assert_eq!(validate_letter("λ"), Err(InputError::NotAlphabetic));
    }

    #[test]
    fn test_win_by_guessing_every_letter() {
        let mut state = round("cat");
        assert_eq!(state.guess("c", t0()), Ok(GuessOutcome::Hit { positions: 1 }));
        assert_eq!(state.guess("a", t0()), Ok(GuessOutcome::Hit { positions: 1 }));
        assert_eq!(
            state.guess("t", t0() + Duration::from_secs(10)),
            Ok(GuessOutcome::Won)
        );
        assert_eq!(state.status(), RoundStatus::Won);
        assert!(state.incorrect_guesses().is_empty());
        assert_eq!(
            state.elapsed(t0() + Duration::from_secs(99)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_lose_after_max_incorrect() {
        let mut state = round("cat");
        for (i, letter) in ["x", "z", "q", "w", "y"].iter().enumerate() {
            assert_eq!(
                state.guess(letter, t0()),
                Ok(GuessOutcome::Miss {
                    remaining: 5 - i as u32
                })
            );
            assert_invariants(&state);
        }
        assert_eq!(state.guess("v", t0()), Ok(GuessOutcome::Lost));
        assert_eq!(state.status(), RoundStatus::Lost);
        assert_eq!(state.incorrect_count(), 6);
        assert_eq!(
            state.guess("c", t0()),
            Err(GuessError::NotPlaying(RoundStatus::Lost))
        );
    }

    #[test]
    fn test_repeat_guess_is_idempotent() {
        let mut state = round("cat");
        state.guess("x", t0()).unwrap();
        let guessed = state.guessed_letters().clone();
        let incorrect = state.incorrect_guesses().to_vec();
        assert_eq!(state.guess("X", t0()), Ok(GuessOutcome::AlreadyGuessed));
        assert_eq!(state.guessed_letters(), &guessed);
        assert_eq!(state.incorrect_guesses(), incorrect.as_slice());
    }

    #[test]
    fn test_malformed_guess_does_not_mutate() {
        let mut state = round("cat");
        assert_eq!(
            state.guess("42", t0()),
            Err(GuessError::Input(InputError::MultiCharacter))
        );
        assert!(state.guessed_letters().is_empty());
        assert_eq!(state.status(), RoundStatus::Playing);
    }

    #[test]
    fn test_spaces_are_pre_revealed() {
        let mut state = round("sea lion");
        assert_eq!(state.masked_word(), "___ ____");
        for letter in ["s", "e", "a", "l", "i", "o"] {
            state.guess(letter, t0()).unwrap();
        }
        assert_eq!(state.masked_word(), "sea lio_");
        assert_eq!(state.hidden_letters(), vec!['n']);
        assert_eq!(state.guess("n", t0()), Ok(GuessOutcome::Won));
    }

    #[test]
    fn test_accented_word_matches_plain_letter() {
        let mut state = round("café");
        state.guess("e", t0()).unwrap();
        assert_eq!(state.masked_word(), "___é");
    }

    #[test]
    fn test_pause_resume_guards() {
        let mut state = round("cat");
        assert!(!state.resume(t0()));
        assert!(state.pause(t0()));
        assert!(!state.pause(t0()));
        assert_eq!(
            state.guess("c", t0()),
            Err(GuessError::NotPlaying(RoundStatus::Paused))
        );
        assert!(state.resume(t0() + Duration::from_secs(30)));
        assert!(!state.resume(t0()));
        assert_eq!(state.elapsed(t0() + Duration::from_secs(31)), Duration::from_secs(1));
    }

    #[test]
    fn test_terminal_status_is_frozen() {
        let mut state = round("cat");
        assert!(state.quit(t0()));
        assert!(!state.quit(t0()));
        assert!(!state.pause(t0()));
        assert!(!state.expire(t0()));
        assert_eq!(state.status(), RoundStatus::Quit);
    }

    #[test]
    fn test_hint_counts_and_reveals() {
        let mut state = round("cat");
        assert_eq!(state.hint('a', t0()), Ok(GuessOutcome::Hit { positions: 1 }));
        assert_eq!(state.hints_used(), 1);
        assert_eq!(state.masked_word(), "_a_");
    }
}
