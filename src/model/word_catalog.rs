use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Difficulty;
use crate::helpers::fold_letter;

pub type CatalogTiers = BTreeMap<Difficulty, BTreeMap<String, Vec<String>>>;

/// difficulty -> category -> words. Categories iterate alphabetically, which
/// makes "first available category" well defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CatalogTiers", into = "CatalogTiers")]
pub struct WordCatalog {
    tiers: CatalogTiers,
}

impl From<CatalogTiers> for WordCatalog {
    fn from(tiers: CatalogTiers) -> Self {
        Self::new(tiers)
    }
}

impl From<WordCatalog> for CatalogTiers {
    fn from(catalog: WordCatalog) -> Self {
        catalog.tiers
    }
}

impl WordCatalog {
    pub fn new(tiers: CatalogTiers) -> Self {
        let mut catalog = Self::default();
        for (difficulty, categories) in tiers {
            for (category, words) in categories {
                catalog.insert(difficulty, &category, words);
            }
        }
        catalog
    }

    /// Words are trimmed and lowercased. Blank words and words with anything
    /// other than letters and interior spaces are dropped.
    pub fn insert<I, S>(&mut self, difficulty: Difficulty, category: &str, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self
            .tiers
            .entry(difficulty)
            .or_default()
            .entry(category.trim().to_lowercase())
            .or_default();
        entry.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| is_guessable(w)),
        );
    }

    pub fn words(&self, difficulty: Difficulty, category: &str) -> Option<&[String]> {
        self.tiers
            .get(&difficulty)
            .and_then(|categories| categories.get(category))
            .map(Vec::as_slice)
    }

    /// Categories holding at least one word.
    pub fn categories(&self, difficulty: Difficulty) -> Vec<&str> {
        self.tiers
            .get(&difficulty)
            .map(|categories| {
                categories
                    .iter()
                    .filter(|(_, words)| !words.is_empty())
                    .map(|(name, _)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_playable(&self, difficulty: Difficulty) -> bool {
        !self.categories(difficulty).is_empty()
    }

    pub fn playable_difficulties(&self) -> Vec<Difficulty> {
        Difficulty::all()
            .into_iter()
            .filter(|d| self.has_playable(*d))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.playable_difficulties().is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.tiers
            .values()
            .flat_map(|categories| categories.values())
            .map(Vec::len)
            .sum()
    }

    /// Small catalog used when the real one cannot be loaded.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.insert(
            Difficulty::Easy,
            "animals",
            ["cat", "dog", "fish", "bird", "frog", "lion", "bear", "duck"],
        );
        catalog.insert(
            Difficulty::Easy,
            "food",
            ["cake", "rice", "soup", "pear", "milk", "bread"],
        );
        catalog.insert(
            Difficulty::Easy,
            "colors",
            ["red", "blue", "green", "pink", "gold"],
        );
        catalog.insert(
            Difficulty::Medium,
            "animals",
            ["giraffe", "dolphin", "penguin", "leopard", "hamster"],
        );
        catalog.insert(
            Difficulty::Medium,
            "countries",
            ["france", "brazil", "canada", "norway", "kenya"],
        );
        catalog.insert(
            Difficulty::Medium,
            "sports",
            ["tennis", "hockey", "cycling", "rowing", "archery"],
        );
        catalog.insert(
            Difficulty::Hard,
            "science",
            ["photosynthesis", "chromosome", "thermodynamics", "electron microscope"],
        );
        catalog.insert(
            Difficulty::Hard,
            "animals",
            ["hippopotamus", "chimpanzee", "rhinoceros", "komodo dragon"],
        );
        catalog.insert(
            Difficulty::Hard,
            "music",
            ["synthesizer", "xylophone", "counterpoint", "french horn"],
        );
        catalog
    }
}

fn is_guessable(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c == ' ' || fold_letter(c).is_ascii_lowercase())
}
