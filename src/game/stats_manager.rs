use std::time::{Duration, SystemTime};

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use itertools::Itertools;
use log::{debug, info};

use crate::error::{DataError, StorageError};
use crate::model::{
    DailyStats, Difficulty, GameStats, GlobalStats, Insights, PerformanceMetrics, PeriodRollup,
    HISTORY_CAPACITY,
};
use crate::storage::{self, PersistenceStore, SetOptions, STATISTICS_KEY};

const IMPROVEMENT_WINDOW: usize = 5;

/// Cumulative statistics across every finished round.
#[derive(Debug, Default)]
pub struct StatsManager {
    stats: GlobalStats,
}

impl StatsManager {
    pub fn load(store: &mut dyn PersistenceStore) -> (Self, Option<DataError>) {
        match storage::load_json(store, STATISTICS_KEY, validate) {
            Ok(Some(stats)) => {
                debug!(target: "stats", "Loaded statistics for {} games", stats.games_played);
                (Self { stats }, None)
            }
            Ok(None) => (Self::default(), None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) -> Result<(), StorageError> {
        storage::save_json_with_recovery(
            store,
            STATISTICS_KEY,
            &self.stats,
            SetOptions::with_metadata("games_played", &self.stats.games_played.to_string()),
        )
    }

    pub fn global_stats(&self) -> &GlobalStats {
        &self.stats
    }

    /// What the record would look like with `record` counted, without
    /// committing it.
    pub fn project(&self, record: &GameStats) -> GlobalStats {
        let mut projected = self.stats.clone();
        apply(&mut projected, record);
        projected
    }

    pub fn record_game(&mut self, record: &GameStats) {
        apply(&mut self.stats, record);
        info!(
            target: "stats",
            "Recorded {} '{}' ({} {}), {} played, streak {}",
            if record.won { "win" } else { "loss" },
            record.word,
            record.difficulty,
            record.category,
            self.stats.games_played,
            self.stats.current_streak
        );
    }

    /// Top scoring rounds still in the history buffer.
    pub fn get_high_scores(&self, difficulty: Difficulty, limit: usize) -> Vec<GameStats> {
        self.stats
            .game_history
            .iter()
            .filter(|game| game.won && game.difficulty == difficulty)
            .sorted_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then(a.completion_time.cmp(&b.completion_time))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Monday to Sunday week containing `date`.
    pub fn weekly_rollup(&self, date: NaiveDate) -> Option<PeriodRollup> {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let start = date.checked_sub_days(Days::new(offset))?;
        let end = start.checked_add_days(Days::new(6))?;
        Some(self.rollup(start, end))
    }

    pub fn monthly_rollup(&self, year: i32, month: u32) -> Option<PeriodRollup> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let end = next_month.pred_opt()?;
        Some(self.rollup(start, end))
    }

    fn rollup(&self, start: NaiveDate, end: NaiveDate) -> PeriodRollup {
        let mut totals = DailyStats::default();
        let mut active_days = 0;
        for (_, day) in self.stats.daily_stats.range(start..=end) {
            totals.absorb(day);
            active_days += 1;
        }
        PeriodRollup {
            start,
            end,
            active_days,
            totals,
        }
    }

    pub fn insights(&self) -> Insights {
        insights_for(&self.stats)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.stats)
    }

    pub fn reset(&mut self) {
        self.stats = GlobalStats::default();
    }
}

pub fn day_of(at: SystemTime) -> NaiveDate {
    DateTime::<Utc>::from(at).date_naive()
}

fn apply(stats: &mut GlobalStats, record: &GameStats) {
    stats.games_played += 1;
    if record.won {
        stats.games_won += 1;
        stats.current_streak += 1;
        stats.best_streak = stats.best_streak.max(stats.current_streak);
        stats.fastest_win = Some(match stats.fastest_win {
            Some(fastest) => fastest.min(record.completion_time),
            None => record.completion_time,
        });
    } else {
        stats.games_lost += 1;
        stats.current_streak = 0;
    }
    stats.correct_guesses += u64::from(record.correct_guesses);
    stats.incorrect_guesses += u64::from(record.incorrect_guesses);
    stats.hints_used += u64::from(record.hints_used);
    stats.total_score += u64::from(record.score);
    stats.total_play_time += record.completion_time;

    for breakdown in [
        stats.difficulty_stats.entry(record.difficulty).or_default(),
        stats.category_stats.entry(record.category.clone()).or_default(),
    ] {
        breakdown.played += 1;
        breakdown.total_time += record.completion_time;
        if record.won {
            breakdown.won += 1;
            breakdown.best_time = Some(
                breakdown
                    .best_time
                    .map_or(record.completion_time, |best| best.min(record.completion_time)),
            );
        } else {
            breakdown.lost += 1;
        }
    }

    let day = stats.daily_stats.entry(day_of(record.finished_at)).or_default();
    day.absorb(&DailyStats {
        played: 1,
        won: u32::from(record.won),
        lost: u32::from(!record.won),
        score: u64::from(record.score),
        play_time: record.completion_time,
    });

    stats.game_history.push_back(record.clone());
    while stats.game_history.len() > HISTORY_CAPACITY {
        stats.game_history.pop_front();
    }

    stats.performance_metrics = compute_metrics(stats);
}

fn compute_metrics(stats: &GlobalStats) -> PerformanceMetrics {
    let total_guesses = stats.total_guesses();
    let accuracy = if total_guesses == 0 {
        0.0
    } else {
        stats.correct_guesses as f64 / total_guesses as f64 * 100.0
    };

    let minutes = stats.total_play_time.as_secs_f64() / 60.0;
    let efficiency = if minutes > 0.0 {
        stats.total_score as f64 / minutes
    } else {
        0.0
    };

    let win_times: Vec<f64> = stats
        .game_history
        .iter()
        .filter(|game| game.won)
        .map(|game| game.completion_time.as_secs_f64())
        .collect();
    let consistency = std_deviation(&win_times);

    PerformanceMetrics {
        accuracy,
        efficiency,
        consistency,
        improvement: improvement(stats),
    }
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Percent faster over the latest five rounds than the five before them.
fn improvement(stats: &GlobalStats) -> Option<f64> {
    let history = &stats.game_history;
    if history.len() < IMPROVEMENT_WINDOW * 2 {
        return None;
    }
    let average = |games: &[&GameStats]| {
        games
            .iter()
            .map(|g| g.completion_time)
            .sum::<Duration>()
            .as_secs_f64()
            / games.len() as f64
    };
    let latest: Vec<&GameStats> = history.iter().rev().take(IMPROVEMENT_WINDOW * 2).collect();
    let (recent, prior) = latest.split_at(IMPROVEMENT_WINDOW);
    let prior_avg = average(prior);
    if prior_avg == 0.0 {
        return None;
    }
    Some((prior_avg - average(recent)) / prior_avg * 100.0)
}

fn insights_for(stats: &GlobalStats) -> Insights {
    let mut insights = Insights::default();
    if stats.games_played == 0 {
        insights
            .recommendations
            .push("Play a few rounds to start building insights.".to_string());
        return insights;
    }
    let metrics = &stats.performance_metrics;

    if metrics.accuracy > 80.0 {
        insights
            .strengths
            .push(format!("Sharp guessing: {:.0}% of your letters hit.", metrics.accuracy));
    } else if metrics.accuracy < 50.0 {
        insights
            .improvements
            .push("More than half of your guesses miss. Open with common vowels.".to_string());
    }

    if metrics.efficiency < 20.0 {
        insights
            .improvements
            .push("Rounds run long for the points they earn. Try committing to guesses sooner.".to_string());
    } else if metrics.efficiency >= 60.0 {
        insights
            .strengths
            .push(format!("Efficient play at {:.0} points per minute.", metrics.efficiency));
    }

    let win_rate = stats.win_rate();
    if win_rate >= 70.0 {
        insights.strengths.push(format!("Winning {win_rate:.0}% of rounds."));
    } else if win_rate < 40.0 {
        insights
            .improvements
            .push(format!("Only {win_rate:.0}% of rounds end in a win."));
    }

    if stats.best_streak >= 5 {
        insights
            .strengths
            .push(format!("Best streak of {} wins.", stats.best_streak));
    }

    match metrics.improvement {
        Some(change) if change > 10.0 => insights
            .strengths
            .push(format!("Recent rounds are {change:.0}% faster.")),
        Some(change) if change < -10.0 => insights
            .improvements
            .push(format!("Recent rounds are {:.0}% slower.", -change)),
        _ => {}
    }

    if stats.categories_played() < 5 {
        insights
            .recommendations
            .push("Branch out into other categories.".to_string());
    }
    let hard_played = stats
        .difficulty_stats
        .get(&Difficulty::Hard)
        .map_or(0, |hard| hard.played);
    if hard_played == 0 && win_rate >= 60.0 {
        insights
            .recommendations
            .push("You are ready for hard words.".to_string());
    }
    if stats.hints_used > u64::from(stats.games_played) {
        insights
            .recommendations
            .push("Lean on hints less to keep scores up.".to_string());
    }
    insights
}

fn validate(stats: &GlobalStats) -> Result<(), String> {
    if stats.games_won + stats.games_lost != stats.games_played {
        return Err(format!(
            "{} won + {} lost does not add up to {} played",
            stats.games_won, stats.games_lost, stats.games_played
        ));
    }
    if stats.current_streak > stats.best_streak {
        return Err("current streak exceeds best streak".to_string());
    }
    if stats.game_history.len() > HISTORY_CAPACITY {
        return Err(format!("history holds {} records", stats.game_history.len()));
    }
    Ok(())
}
