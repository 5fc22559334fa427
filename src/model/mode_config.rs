use std::fmt;

use serde::{Deserialize, Serialize};

use super::Difficulty;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Normal,
    Practice,
    Timed,
    Multiplayer,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Normal => "normal",
            ModeKind::Practice => "practice",
            ModeKind::Timed => "timed",
            ModeKind::Multiplayer => "multiplayer",
        };
        f.write_str(name)
    }
}

/// Inclusive bounds on word length, interior spaces not counted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LengthFilter {
    pub min: usize,
    pub max: usize,
}

impl LengthFilter {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().filter(|c| *c != ' ').count();
        len >= self.min && len <= self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeConfig {
    #[serde(default = "default_true")]
    pub allow_repeats: bool,
    #[serde(default)]
    pub endless: bool,
    #[serde(default)]
    pub locked_difficulty: Option<Difficulty>,
    #[serde(default)]
    pub max_mistakes_override: Option<u32>,
    #[serde(default)]
    pub word_length_filter: Option<LengthFilter>,
}

fn default_true() -> bool {
    true
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            allow_repeats: true,
            endless: false,
            locked_difficulty: None,
            max_mistakes_override: None,
            word_length_filter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub score: u64,
    pub wins: u32,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            score: 0,
            wins: 0,
        }
    }
}

/// Final multiplayer result. Everyone tied with the leader is a winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub rankings: Vec<Player>,
    pub winners: Vec<String>,
    pub rounds_played: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_filter_ignores_spaces() {
        let filter = LengthFilter::new(4, 7);
        assert!(filter.accepts("sea lion"));
        assert!(!LengthFilter::new(4, 6).accepts("sea lion"));
        assert!(!filter.accepts("cat"));
        assert!(!filter.accepts("hippopotamus"));
    }

    #[test]
    fn test_practice_config_defaults_from_partial_json() {
        let config: PracticeConfig = serde_json::from_str(r#"{"endless": true}"#).unwrap();
        assert!(config.endless);
        assert!(config.allow_repeats);
        assert_eq!(config.max_mistakes_override, None);
    }
}
