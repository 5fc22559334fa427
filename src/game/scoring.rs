use std::time::Duration;

use crate::model::Difficulty;

pub const BASE_POINTS: u32 = 100;
pub const MINIMUM_WIN_SCORE: u32 = 50;
const EFFICIENCY_POINTS_PER_SPARE_MISS: u32 = 10;
const PAR_TIME_MS: i64 = 30_000;
const POINTS_PER_SECOND_UNDER_PAR: i64 = 2;
const TIMED_BONUS_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// Bonus for finishing under 30 seconds.
    Untimed { elapsed: Duration },
    /// Bonus proportional to the share of the clock left.
    Countdown {
        remaining: Duration,
        limit: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    pub difficulty: Difficulty,
    pub max_incorrect: u32,
    pub incorrect_count: u32,
    pub timing: Timing,
    /// Practice-mode hint penalty, 1.0 when no penalty applies.
    pub penalty_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub efficiency_bonus: u32,
    pub time_bonus: u32,
    pub multiplier: u32,
    pub total: u32,
}

pub fn time_bonus(timing: Timing) -> u32 {
    match timing {
        Timing::Untimed { elapsed } => {
            let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
            let under_par_secs = (PAR_TIME_MS - elapsed_ms).div_euclid(1000);
            (under_par_secs * POINTS_PER_SECOND_UNDER_PAR).max(0) as u32
        }
        Timing::Countdown { remaining, limit } => {
            if limit.is_zero() {
                return 0;
            }
            let share = remaining.as_secs_f64() / limit.as_secs_f64();
            (share.clamp(0.0, 1.0) * TIMED_BONUS_MAX).round() as u32
        }
    }
}

/// Points for a won round. Never below `MINIMUM_WIN_SCORE`.
pub fn score_win(input: &ScoreInput) -> ScoreBreakdown {
    let efficiency_bonus = input
        .max_incorrect
        .saturating_sub(input.incorrect_count)
        .saturating_mul(EFFICIENCY_POINTS_PER_SPARE_MISS);
    let time_bonus = time_bonus(input.timing);
    let multiplier = input.difficulty.multiplier();
    let raw = BASE_POINTS
        .saturating_add(efficiency_bonus)
        .saturating_add(time_bonus)
        .saturating_mul(multiplier);
    let adjusted = match input.penalty_multiplier {
        Some(penalty) => (f64::from(raw) * penalty).round().max(0.0) as u32,
        None => raw,
    };
    ScoreBreakdown {
        base: BASE_POINTS,
        efficiency_bonus,
        time_bonus,
        multiplier,
        total: adjusted.max(MINIMUM_WIN_SCORE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn easy_input(elapsed_ms: u64, incorrect: u32) -> ScoreInput {
        ScoreInput {
            difficulty: Difficulty::Easy,
            max_incorrect: 6,
            incorrect_count: incorrect,
            timing: Timing::Untimed {
                elapsed: Duration::from_millis(elapsed_ms),
            },
            penalty_multiplier: None,
        }
    }

    #[test]
    fn test_quick_perfect_easy_win() {
        let score = score_win(&easy_input(10_000, 0));
        assert_eq!(score.efficiency_bonus, 60);
        assert_eq!(score.time_bonus, 40);
        assert_eq!(score.total, 200);
    }

    #[test]
    fn test_time_bonus_floors_partial_seconds() {
        assert_eq!(time_bonus(Timing::Untimed { elapsed: Duration::from_millis(10_500) }), 38);
        assert_eq!(time_bonus(Timing::Untimed { elapsed: Duration::from_millis(29_999) }), 0);
        assert_eq!(time_bonus(Timing::Untimed { elapsed: Duration::from_secs(95) }), 0);
    }

    #[test]
    fn test_difficulty_multiplies_everything() {
        let mut input = easy_input(40_000, 2);
        input.difficulty = Difficulty::Hard;
        // (100 + 40 + 0) * 3
        assert_eq!(score_win(&input).total, 420);
    }

    #[test]
    fn test_countdown_bonus_uses_share_remaining() {
        let mut input = easy_input(0, 6);
        input.timing = Timing::Countdown {
            remaining: Duration::from_secs(45),
            limit: Duration::from_secs(60),
        };
        // (100 + 0 + 75) * 1
        assert_eq!(score_win(&input).total, 175);
    }

    #[test]
    fn test_oversized_inputs_saturate() {
        let mut input = easy_input(0, 0);
        input.max_incorrect = u32::MAX;
        input.difficulty = Difficulty::Hard;
        assert_eq!(score_win(&input).total, u32::MAX);
    }

    #[test]
    fn test_practice_penalty_rounds_then_floors() {
        let mut input = easy_input(10_000, 0);
        input.penalty_multiplier = Some(0.9 * 0.9);
        assert_eq!(score_win(&input).total, 162);

        input.penalty_multiplier = Some(0.9_f64.powi(20));
        assert_eq!(score_win(&input).total, MINIMUM_WIN_SCORE);
    }
}
