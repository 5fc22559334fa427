use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::SelectionError;
use crate::model::{Difficulty, LengthFilter, WordCatalog};

pub const MAX_FALLBACK_ATTEMPTS: usize = 5;

pub type SeenWords = HashMap<String, HashSet<String>>;

pub fn seen_key(difficulty: Difficulty, category: &str) -> String {
    format!("{difficulty}-{category}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub word: String,
    pub difficulty: Difficulty,
    pub category: String,
}

/// Practice-mode narrowing. `seen_words` is only present while practice mode
/// is active; every served word is recorded there.
#[derive(Debug)]
pub struct SelectionFilters<'a> {
    pub word_length: Option<LengthFilter>,
    pub allow_repeats: bool,
    pub seen_words: Option<&'a mut SeenWords>,
}

impl SelectionFilters<'_> {
    pub fn unrestricted() -> Self {
        Self {
            word_length: None,
            allow_repeats: true,
            seen_words: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct WordSelector {
    current: Option<String>,
}

impl WordSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn select<R: Rng + ?Sized>(
        &mut self,
        catalog: &WordCatalog,
        difficulty: Difficulty,
        category: &str,
        mut filters: SelectionFilters<'_>,
        rng: &mut R,
    ) -> Result<Selection, SelectionError> {
        if catalog.is_empty() {
            return Err(SelectionError::EmptyCatalog);
        }
        let difficulty = resolve_difficulty(catalog, difficulty)?;
        let category = resolve_category(catalog, difficulty, category);
        let key = seen_key(difficulty, &category);
        let words = catalog.words(difficulty, &category).unwrap_or_default();

        let mut chosen = None;
        for pass in 0..2 {
            let pool = candidates(words, &key, &mut filters);
            if let Some(word) = pool.choose(rng) {
                chosen = Some(word.to_lowercase());
                break;
            }
            if pass == 0 {
                debug!(target: "word_selector", "No candidates for {}, clearing seen words", key);
                if let Some(seen) = filters.seen_words.as_deref_mut() {
                    seen.remove(&key);
                }
            }
        }

        let Some(word) = chosen else {
            warn!(target: "word_selector", "Selection exhausted for {}", key);
            return Err(SelectionError::NoCandidates {
                difficulty,
                category,
            });
        };

        if let Some(seen) = filters.seen_words.as_deref_mut() {
            seen.entry(key).or_default().insert(word.clone());
        }
        self.current = Some(word.clone());
        Ok(Selection {
            word,
            difficulty,
            category,
        })
    }
}

/// Requested tier first, then any other tier with words. Bounded.
fn resolve_difficulty(
    catalog: &WordCatalog,
    requested: Difficulty,
) -> Result<Difficulty, SelectionError> {
    let fallbacks = Difficulty::all()
        .into_iter()
        .filter(|d| *d != requested);
    let attempts = std::iter::once(requested)
        .chain(fallbacks)
        .take(MAX_FALLBACK_ATTEMPTS);
    let mut tried = 0;
    for candidate in attempts {
        tried += 1;
        if catalog.has_playable(candidate) {
            if candidate != requested {
                warn!(target: "word_selector", "No words for {}, falling back to {}", requested, candidate);
            }
            return Ok(candidate);
        }
    }
    Err(SelectionError::NoDifficultyAvailable { attempts: tried })
}

fn resolve_category(catalog: &WordCatalog, difficulty: Difficulty, requested: &str) -> String {
    let requested = requested.trim().to_lowercase();
    if catalog
        .words(difficulty, &requested)
        .is_some_and(|w| !w.is_empty())
    {
        return requested;
    }
    let fallback = catalog
        .categories(difficulty)
        .first()
        .map(|c| c.to_string())
        .unwrap_or_default();
    debug!(target: "word_selector", "Category '{}' unavailable for {}, using '{}'", requested, difficulty, fallback);
    fallback
}

fn candidates<'w>(
    words: &'w [String],
    key: &str,
    filters: &mut SelectionFilters<'_>,
) -> Vec<&'w String> {
    let length_filtered: Vec<&String> = words
        .iter()
        .filter(|w| filters.word_length.map_or(true, |f| f.accepts(w)))
        .collect();
    if filters.allow_repeats {
        return length_filtered;
    }
    let Some(seen) = filters.seen_words.as_deref_mut() else {
        return length_filtered;
    };
    let unseen: Vec<&String> = match seen.get(key) {
        Some(already) => length_filtered
            .iter()
            .copied()
            .filter(|w| !already.contains(*w))
            .collect(),
        None => length_filtered.clone(),
    };
    if unseen.is_empty() && !length_filtered.is_empty() {
        debug!(target: "word_selector", "Every word in {} served, starting over", key);
        seen.remove(key);
        return length_filtered;
    }
    unseen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> WordCatalog {
        let mut catalog = WordCatalog::default();
        catalog.insert(Difficulty::Easy, "animals", ["cat", "dog", "owl"]);
        catalog.insert(Difficulty::Easy, "food", ["pie", "banana"]);
        catalog.insert(Difficulty::Hard, "science", ["photosynthesis"]);
        catalog
    }

    #[test]
    fn test_selects_from_requested_bucket() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(7);
        let selection = selector
            .select(&catalog(), Difficulty::Easy, "animals", SelectionFilters::unrestricted(), &mut rng)
            .unwrap();
        assert_eq!(selection.difficulty, Difficulty::Easy);
        assert_eq!(selection.category, "animals");
        assert!(["cat", "dog", "owl"].contains(&selection.word.as_str()));
        assert_eq!(selector.current(), Some(selection.word.as_str()));
    }

    #[test]
    fn test_falls_back_on_missing_difficulty_and_category() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let selection = selector
            .select(&catalog(), Difficulty::Medium, "nope", SelectionFilters::unrestricted(), &mut rng)
            .unwrap();
        assert_eq!(selection.difficulty, Difficulty::Easy);
        assert_eq!(selection.category, "animals");

        let selection = selector
            .select(&catalog(), Difficulty::Hard, "food", SelectionFilters::unrestricted(), &mut rng)
            .unwrap();
        assert_eq!(selection.category, "science");
    }

    #[test]
    fn test_empty_catalog_is_a_selection_failure() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let result = selector.select(
            &WordCatalog::default(),
            Difficulty::Easy,
            "animals",
            SelectionFilters::unrestricted(),
            &mut rng,
        );
        assert_eq!(result, Err(SelectionError::EmptyCatalog));
        assert_eq!(selector.current(), None);
    }

    #[test]
    fn test_length_filter_with_no_match_fails() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(1);
        let filters = SelectionFilters {
            word_length: Some(LengthFilter::new(10, 12)),
            ..SelectionFilters::unrestricted()
        };
        let result = selector.select(&catalog(), Difficulty::Easy, "food", filters, &mut rng);
        assert_eq!(
            result,
            Err(SelectionError::NoCandidates {
                difficulty: Difficulty::Easy,
                category: "food".to_string()
            })
        );
    }

    #[test]
    fn test_length_filter_narrows_candidates() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let filters = SelectionFilters {
                word_length: Some(LengthFilter::new(4, 8)),
                ..SelectionFilters::unrestricted()
            };
            let selection = selector
                .select(&catalog(), Difficulty::Easy, "food", filters, &mut rng)
                .unwrap();
            assert_eq!(selection.word, "banana");
        }
    }

    #[test]
    fn test_no_repeats_until_category_exhausted() {
        let mut selector = WordSelector::new();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = SeenWords::new();
        let mut served = Vec::new();
        for _ in 0..3 {
            let filters = SelectionFilters {
                word_length: None,
                allow_repeats: false,
                seen_words: Some(&mut seen),
            };
            served.push(
                selector
                    .select(&catalog(), Difficulty::Easy, "animals", filters, &mut rng)
                    .unwrap()
                    .word,
            );
        }
        served.sort();
        assert_eq!(served, vec!["cat", "dog", "owl"]);
        assert_eq!(seen[&seen_key(Difficulty::Easy, "animals")].len(), 3);

        // fourth pick starts a fresh cycle
        let filters = SelectionFilters {
            word_length: None,
            allow_repeats: false,
            seen_words: Some(&mut seen),
        };
        let fourth = selector
            .select(&catalog(), Difficulty::Easy, "animals", filters, &mut rng)
            .unwrap();
        assert!(served.contains(&fourth.word));
        assert_eq!(seen[&seen_key(Difficulty::Easy, "animals")].len(), 1);
    }
}
