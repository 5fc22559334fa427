use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::{DurationMilliSeconds, TimestampMilliSeconds};
use uuid::Uuid;

use super::{Difficulty, ModeKind};

pub const HISTORY_CAPACITY: usize = 100;

/// One finished (won or lost) round.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStats {
    pub playthrough_id: Uuid,
    pub word: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub mode: ModeKind,
    pub won: bool,
    pub correct_guesses: u32,
    pub incorrect_guesses: u32,
    pub hints_used: u32,
    pub score: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub completion_time: Duration,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub finished_at: SystemTime,
}

impl GameStats {
    pub fn total_guesses(&self) -> u32 {
        self.correct_guesses + self.incorrect_guesses
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakdownStats {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub total_time: Duration,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(default)]
    pub best_time: Option<Duration>,
}

impl BreakdownStats {
    pub fn average_time(&self) -> Duration {
        if self.played == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.played
        }
    }

    pub fn win_rate(&self) -> f64 {
        percentage(self.won, self.played)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStats {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub score: u64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub play_time: Duration,
}

impl DailyStats {
    pub fn absorb(&mut self, other: &DailyStats) {
        self.played += other.played;
        self.won += other.won;
        self.lost += other.lost;
        self.score += other.score;
        self.play_time += other.play_time;
    }
}

/// A weekly or monthly aggregate built from daily buckets on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRollup {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub active_days: u32,
    pub totals: DailyStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    /// correct guesses / all guesses, percent
    pub accuracy: f64,
    /// points per minute played
    pub efficiency: f64,
    /// std deviation of winning times, seconds
    pub consistency: f64,
    /// % faster over the last five rounds versus the five before
    pub improvement: Option<f64>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub correct_guesses: u64,
    pub incorrect_guesses: u64,
    pub hints_used: u64,
    pub total_score: u64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub total_play_time: Duration,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub fastest_win: Option<Duration>,
    pub difficulty_stats: BTreeMap<Difficulty, BreakdownStats>,
    pub category_stats: BTreeMap<String, BreakdownStats>,
    pub game_history: VecDeque<GameStats>,
    pub daily_stats: BTreeMap<NaiveDate, DailyStats>,
    pub performance_metrics: PerformanceMetrics,
}

impl GlobalStats {
    pub fn total_guesses(&self) -> u64 {
        self.correct_guesses + self.incorrect_guesses
    }

    pub fn win_rate(&self) -> f64 {
        percentage(self.games_won, self.games_played)
    }

    pub fn average_guesses(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_guesses() as f64 / f64::from(self.games_played)
        }
    }

    pub fn average_play_time(&self) -> Duration {
        if self.games_played == 0 {
            Duration::ZERO
        } else {
            self.total_play_time / self.games_played
        }
    }

    pub fn categories_played(&self) -> usize {
        self.category_stats.values().filter(|c| c.played > 0).count()
    }
}

/// Human-readable advice derived from the metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages_on_empty_record() {
        let stats = GlobalStats::default();
        assert_eq!(stats.win_rate(), 0.0);
        assert_eq!(stats.average_guesses(), 0.0);
        assert_eq!(stats.average_play_time(), Duration::ZERO);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let stats: GlobalStats =
            serde_json::from_str(r#"{"games_played": 3, "games_won": 2, "games_lost": 1}"#)
                .unwrap();
        assert_eq!(stats.games_played, 3);
        assert!(stats.game_history.is_empty());
        assert!((stats.win_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_breakdown_average_time() {
        let breakdown = BreakdownStats {
            played: 4,
            won: 3,
            lost: 1,
            total_time: Duration::from_secs(40),
            best_time: Some(Duration::from_secs(6)),
        };
        assert_eq!(breakdown.average_time(), Duration::from_secs(10));
        assert_eq!(breakdown.win_rate(), 75.0);
    }
}
