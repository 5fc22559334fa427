use std::collections::BTreeMap;

use log::info;

use crate::model::Difficulty;

/// Consecutive-win promotion through the tiers. Difficulty never drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyProgression {
    consecutive_wins: u32,
    thresholds: BTreeMap<Difficulty, u32>,
    order: Vec<Difficulty>,
}

impl Default for DifficultyProgression {
    fn default() -> Self {
        Self {
            consecutive_wins: 0,
            thresholds: BTreeMap::from([(Difficulty::Medium, 3), (Difficulty::Hard, 7)]),
            order: Difficulty::all(),
        }
    }
}

impl DifficultyProgression {
    pub fn consecutive_wins(&self) -> u32 {
        self.consecutive_wins
    }

    pub fn threshold(&self, tier: Difficulty) -> Option<u32> {
        self.thresholds.get(&tier).copied()
    }

    /// Returns the tier the *next* round should use when this win crosses a
    /// threshold. The caller applies it; the finished round keeps its tier.
    pub fn record_win(&mut self, current: Difficulty) -> Option<Difficulty> {
        self.consecutive_wins += 1;
        let position = self.order.iter().position(|d| *d == current)?;
        let next = *self.order.get(position + 1)?;
        let needed = self.thresholds.get(&next)?;
        if self.consecutive_wins >= *needed {
            info!(target: "progression", "{} consecutive wins, promoting {} -> {}", self.consecutive_wins, current, next);
            Some(next)
        } else {
            None
        }
    }

    pub fn record_loss(&mut self) {
        self.consecutive_wins = 0;
    }

    pub fn reset(&mut self) {
        self.consecutive_wins = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotes_at_thresholds() {
        let mut progression = DifficultyProgression::default();
        let mut difficulty = Difficulty::Easy;
        let mut promotions = Vec::new();
        for _ in 0..7 {
            if let Some(next) = progression.record_win(difficulty) {
                promotions.push((progression.consecutive_wins(), next));
                difficulty = next;
            }
        }
        assert_eq!(
            promotions,
            vec![(3, Difficulty::Medium), (7, Difficulty::Hard)]
        );
        assert_eq!(progression.record_win(Difficulty::Hard), None);
    }

    #[test]
    fn test_loss_resets_streak_but_not_tier() {
        let mut progression = DifficultyProgression::default();
        progression.record_win(Difficulty::Easy);
        progression.record_win(Difficulty::Easy);
        progression.record_loss();
        assert_eq!(progression.consecutive_wins(), 0);
        assert_eq!(progression.record_win(Difficulty::Easy), None);
        assert_eq!(progression.threshold(Difficulty::Medium), Some(3));
    }
}
