use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::game::game_state::MAX_INCORRECT_LIMIT;
use crate::game::scheduler::TaskHandle;
use crate::game::word_selector::{SeenWords, SelectionFilters};
use crate::model::{Difficulty, PracticeConfig};

const HINT_PENALTY: f64 = 0.9;

/// Per-category practice progress. A word is mastered once won with at
/// most one miss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMastery {
    pub attempted: u32,
    pub won: u32,
    pub mastered: BTreeSet<String>,
}

#[derive(Debug)]
pub struct PracticeState {
    config: PracticeConfig,
    hints_used: u32,
    penalty_multiplier: f64,
    seen_words: SeenWords,
    mastery: BTreeMap<String, CategoryMastery>,
    pub(crate) auto_continue: Option<TaskHandle>,
}

impl PracticeState {
    pub fn new(config: PracticeConfig) -> Self {
        Self {
            config,
            hints_used: 0,
            penalty_multiplier: 1.0,
            seen_words: SeenWords::new(),
            mastery: BTreeMap::new(),
            auto_continue: None,
        }
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn penalty_multiplier(&self) -> f64 {
        self.penalty_multiplier
    }

    pub fn seen_words(&self) -> &SeenWords {
        &self.seen_words
    }

    pub fn mastery(&self) -> &BTreeMap<String, CategoryMastery> {
        &self.mastery
    }

    pub fn max_incorrect(&self, default: u32) -> u32 {
        self.config
            .max_mistakes_override
            .filter(|max| *max > 0)
            .map(|max| max.min(MAX_INCORRECT_LIMIT))
            .unwrap_or(default)
    }

    pub fn difficulty(&self, requested: Difficulty) -> Difficulty {
        self.config.locked_difficulty.unwrap_or(requested)
    }

    pub fn selection_filters(&mut self) -> SelectionFilters<'_> {
        SelectionFilters {
            word_length: self.config.word_length_filter,
            allow_repeats: self.config.allow_repeats,
            seen_words: Some(&mut self.seen_words),
        }
    }

    /// Hint count and penalty only apply to the round in progress.
    pub fn begin_round(&mut self) {
        self.hints_used = 0;
        self.penalty_multiplier = 1.0;
    }

    pub fn record_hint(&mut self) {
        self.hints_used += 1;
        self.penalty_multiplier *= HINT_PENALTY;
        debug!(target: "practice", "Hint {} used, penalty now {:.3}", self.hints_used, self.penalty_multiplier);
    }

    pub fn record_result(&mut self, category: &str, word: &str, won: bool, incorrect: u32) {
        let entry = self.mastery.entry(category.to_string()).or_default();
        entry.attempted += 1;
        if won {
            entry.won += 1;
            if incorrect <= 1 && entry.mastered.insert(word.to_string()) {
                debug!(target: "practice", "Mastered '{}' in {}", word, category);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_penalty_compounds_and_resets() {
        let mut practice = PracticeState::new(PracticeConfig::default());
        practice.record_hint();
        practice.record_hint();
        assert_eq!(practice.hints_used(), 2);
        assert!((practice.penalty_multiplier() - 0.81).abs() < 1e-12);
        practice.begin_round();
        assert_eq!(practice.hints_used(), 0);
        assert_eq!(practice.penalty_multiplier(), 1.0);
    }

    #[test]
    fn test_mastery_requires_at_most_one_miss() {
        let mut practice = PracticeState::new(PracticeConfig::default());
        practice.record_result("animals", "cat", true, 1);
        practice.record_result("animals", "dog", true, 2);
        practice.record_result("animals", "owl", false, 6);
        let animals = &practice.mastery()["animals"];
        assert_eq!(animals.attempted, 3);
        assert_eq!(animals.won, 2);
        assert_eq!(animals.mastered.iter().collect::<Vec<_>>(), vec!["cat"]);
    }

    #[test]
    fn test_zero_override_is_ignored() {
        let practice = PracticeState::new(PracticeConfig {
            max_mistakes_override: Some(0),
            ..PracticeConfig::default()
        });
        assert_eq!(practice.max_incorrect(6), 6);
    }

    #[test]
    fn test_huge_override_is_capped() {
        let practice = PracticeState::new(PracticeConfig {
            max_mistakes_override: Some(500_000_000),
            ..PracticeConfig::default()
        });
        assert_eq!(practice.max_incorrect(6), MAX_INCORRECT_LIMIT);
    }
}
