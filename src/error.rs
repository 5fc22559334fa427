use thiserror::Error;

use crate::model::{Difficulty, RoundStatus};

/// Why a guess was rejected before it touched the round.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("enter a letter")]
    Empty,
    #[error("numbers are not letters")]
    Digit,
    #[error("punctuation is not a letter")]
    Punctuation,
    #[error("guess one letter at a time")]
    MultiCharacter,
    #[error("only letters a-z can be guessed")]
    NotAlphabetic,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuessError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("round is not being played (status: {0:?})")]
    NotPlaying(RoundStatus),
    #[error("no round is active")]
    NoActiveRound,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("word catalog is empty")]
    EmptyCatalog,
    #[error("no playable difficulty found after {attempts} attempts")]
    NoDifficultyAvailable { attempts: usize },
    #[error("no words left for {difficulty:?}/{category}")]
    NoCandidates {
        difficulty: Difficulty,
        category: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("multiplayer needs at least one named player")]
    NoPlayers,
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Corrupted persisted data. Always recovered by resetting the structure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("could not parse stored '{key}': {message}")]
    Parse { key: String, message: String },
    #[error("stored '{key}' failed validation: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage quota exceeded writing '{key}' ({needed} bytes needed, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    #[error("storage io error: {0}")]
    Io(String),
    #[error("could not serialize '{key}': {message}")]
    Serialize { key: String, message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogLoadError {
    #[error("could not read word catalog: {0}")]
    Io(String),
    #[error("could not parse word catalog: {0}")]
    Parse(String),
    #[error("word catalog has no words")]
    Empty,
}

impl From<std::io::Error> for CatalogLoadError {
    fn from(err: std::io::Error) -> Self {
        CatalogLoadError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(err: serde_json::Error) -> Self {
        CatalogLoadError::Parse(err.to_string())
    }
}
