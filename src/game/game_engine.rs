use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use uuid::Uuid;

use super::achievement_tracker::{AchievementContext, AchievementTracker};
use super::catalog_provider::WordCatalogProvider;
use super::game_state::{GameState, GuessOutcome};
use super::modes::{
    BestTimes, CategoryMastery, Mode, MultiplayerSession, PracticeState, TimedState,
    COUNTDOWN_INTERVAL,
};
use super::progression::DifficultyProgression;
use super::scheduler::{ScheduledTask, Scheduler};
use super::scoring::{score_win, ScoreInput};
use super::settings::Settings;
use super::stats_manager::StatsManager;
use super::word_selector::WordSelector;
use crate::clock::Clock;
use crate::destroyable::Destroyable;
use crate::error::{GuessError, ModeError, SelectionError, StorageError};
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    AchievementSet, Difficulty, GameEngineCommand, GameEngineEvent, GameStateSnapshot, GameStats,
    GlobalStats, Insights, ModeKind, PeriodRollup, PracticeConfig, RoundStatus, RoundSummary,
    WordCatalog,
};
use crate::storage::{self, PersistenceStore, BEST_TIMES_KEY};

/// Owns one player's session: the active round, cross-round progress and
/// whichever mode is layered on top. Every mutation is followed by a
/// `GameEngineEvent`.
pub struct GameEngine {
    settings: Settings,
    store: Box<dyn PersistenceStore>,
    clock: Rc<dyn Clock>,
    rng: StdRng,
    catalog: WordCatalog,
    offline: bool,
    selector: WordSelector,
    round: Option<GameState>,
    difficulty: Difficulty,
    category: String,
    pending_promotion: Option<Difficulty>,
    session_score: u64,
    progression: DifficultyProgression,
    achievements: AchievementTracker,
    stats: StatsManager,
    mode: Mode,
    scheduler: Scheduler,
    debug_mode: bool,
    persistence_degraded: bool,
    subscription_id: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription_id) = self.subscription_id.take() {
            subscription_id.unsubscribe();
        }
        self.scheduler.cancel_all();
    }
}

impl GameEngine {
    /// Loads settings, statistics and achievements from `store`. Corrupted
    /// entries are reset and reported; a failing provider leaves the engine
    /// on the built-in catalog in offline mode. No round is started yet.
    pub fn new(
        mut store: Box<dyn PersistenceStore>,
        provider: &dyn WordCatalogProvider,
        clock: Rc<dyn Clock>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
    ) -> Self {
        let (settings, settings_saved) = Settings::load(store.as_mut());
        let seed = Settings::seed_from_env().unwrap_or_else(|| rand::rng().next_u64());
        debug!(target: "game_engine", "Seeding word selection with {}", seed);

        let (catalog, offline) = match provider.load() {
            Ok(catalog) => (catalog, false),
            Err(err) => {
                warn!(target: "game_engine", "Catalog unavailable ({}), using built-in words", err);
                (WordCatalog::builtin(), true)
            }
        };

        let (stats, stats_repair) = StatsManager::load(store.as_mut());
        let (achievements, achievements_repair) = AchievementTracker::load(store.as_mut());

        let mut engine = Self {
            difficulty: settings.difficulty,
            category: settings.category.clone(),
            settings,
            store,
            clock,
            rng: StdRng::seed_from_u64(seed),
            catalog,
            offline,
            selector: WordSelector::new(),
            round: None,
            pending_promotion: None,
            session_score: 0,
            progression: DifficultyProgression::default(),
            achievements,
            stats,
            mode: Mode::Normal,
            scheduler: Scheduler::new(),
            debug_mode: Settings::is_debug_mode(),
            persistence_degraded: false,
            subscription_id: None,
            game_engine_event_emitter,
        };

        engine.note_storage(settings_saved);
        for repair in [stats_repair, achievements_repair].into_iter().flatten() {
            error!(target: "game_engine", "Repaired stored data: {}", repair);
            engine.emit(GameEngineEvent::DataRepaired(repair));
        }
        if offline {
            engine.emit(GameEngineEvent::OfflineModeChanged(true));
        }
        engine
    }

    /// Moves the engine behind `Rc<RefCell<_>>` and feeds it commands from
    /// `game_engine_command_observer`.
    pub fn wire(
        self,
        game_engine_command_observer: &EventObserver<GameEngineCommand>,
    ) -> Rc<RefCell<Self>> {
        let engine = Rc::new(RefCell::new(self));
        let handler = Rc::downgrade(&engine);
        let subscription_id = game_engine_command_observer.subscribe_with_handle(move |command| {
            if let Some(engine) = handler.upgrade() {
                engine.borrow_mut().handle_command(command.clone());
            }
        });
        engine.borrow_mut().subscription_id = Some(subscription_id);
        engine
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::Guess(input) => {
                if let Err(err) = self.guess(&input) {
                    debug!(target: "game_engine", "Guess '{}' ignored: {}", input, err);
                }
            }
            GameEngineCommand::Hint => {
                if let Err(err) = self.hint() {
                    debug!(target: "game_engine", "Hint ignored: {}", err);
                }
            }
            GameEngineCommand::Pause => {
                self.pause();
            }
            GameEngineCommand::Resume => {
                self.resume();
            }
            GameEngineCommand::Reset => {
                let _ = self.reset();
            }
            GameEngineCommand::Quit => {
                self.quit();
            }
            GameEngineCommand::Tick => self.tick(),
            GameEngineCommand::SetDifficulty(difficulty) => self.set_difficulty(difficulty),
            GameEngineCommand::SetCategory(category) => self.set_category(&category),
            GameEngineCommand::EnablePracticeMode(config) => {
                let _ = self.enable_practice_mode(config);
            }
            GameEngineCommand::EnableTimedMode(limit) => {
                let _ = self.enable_timed_mode(limit);
            }
            GameEngineCommand::EnableMultiplayerMode {
                players,
                total_rounds,
            } => {
                if let Err(err) = self.enable_multiplayer_mode(players.as_slice(), total_rounds) {
                    warn!(target: "game_engine", "Multiplayer not started: {}", err);
                }
            }
            GameEngineCommand::DisableMode => self.disable_mode(),
            GameEngineCommand::ResetAchievements => self.reset_achievements(),
            GameEngineCommand::ResetStatistics => self.reset_statistics(),
        }
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit_owned(event);
    }

    fn emit_round_updated(&self) {
        if let Some(snapshot) = self.round_snapshot() {
            self.emit(GameEngineEvent::RoundUpdated(snapshot));
        }
    }

    /// Starts a fresh round. Difficulty, category, score and mode carry over;
    /// a promotion earned by the previous round takes effect here. In a
    /// multiplayer session a finished round hands the turn to the next player
    /// whether the reset comes from the auto-advance timer or from a caller.
    pub fn reset(&mut self) -> Result<GameStateSnapshot, SelectionError> {
        let now = self.clock.now();
        let turn_over = matches!(
            &self.mode,
            Mode::Multiplayer(session) if session.auto_advance.is_some() && !session.is_ended()
        );
        self.cancel_scheduled();
        if turn_over {
            if let Mode::Multiplayer(session) = &mut self.mode {
                let next = session.advance();
                debug!(target: "game_engine", "Turn passes to player {}", next);
            }
        }

        if let Some(next) = self.pending_promotion.take() {
            info!(target: "game_engine", "Difficulty promoted to {}", next);
            self.difficulty = next;
            self.settings.difficulty = next;
            self.save_settings();
            self.emit(GameEngineEvent::DifficultyChanged(next));
        }

        if let Mode::Multiplayer(session) = &mut self.mode {
            if session.is_ended() {
                info!(target: "game_engine", "Starting a new multiplayer session");
                session.restart();
            }
        }

        let requested = self.mode.difficulty(self.difficulty);
        let max_incorrect = self.mode.max_incorrect(self.settings.max_incorrect);
        let selection = self.selector.select(
            &self.catalog,
            requested,
            &self.category,
            self.mode.selection_filters(),
            &mut self.rng,
        );
        let selection = match selection {
            Ok(selection) => selection,
            Err(err) => {
                error!(target: "game_engine", "Could not start a round: {}", err);
                self.round = None;
                self.emit(GameEngineEvent::SelectionFailed(err.clone()));
                return Err(err);
            }
        };

        let round = GameState::new(
            Uuid::new_v4(),
            &selection.word,
            selection.difficulty,
            &selection.category,
            max_incorrect,
            now,
        );
        if self.debug_mode {
            debug!(target: "game_engine", "New round word: {}", round.word());
        }

        match &mut self.mode {
            Mode::Practice(practice) => practice.begin_round(),
            Mode::Timed(timed) => {
                timed.restart();
                timed.countdown = Some(self.scheduler.schedule_repeating(
                    now,
                    COUNTDOWN_INTERVAL,
                    ScheduledTask::CountdownTick,
                ));
            }
            Mode::Multiplayer(_) | Mode::Normal => {}
        }

        let snapshot = self.snapshot_of(&round, now);
        self.round = Some(round);
        self.emit(GameEngineEvent::RoundStarted(snapshot.clone()));
        if let Mode::Multiplayer(session) = &self.mode {
            self.emit(GameEngineEvent::PlayerTurn {
                index: session.current_player_index(),
                name: session.current_player().name.clone(),
            });
        }
        Ok(snapshot)
    }

    pub fn guess(&mut self, input: &str) -> Result<GuessOutcome, GuessError> {
        let now = self.clock.now();
        let round = self.round.as_mut().ok_or(GuessError::NoActiveRound)?;
        match round.guess(input, now) {
            Ok(outcome) => {
                self.after_guess(outcome, now);
                Ok(outcome)
            }
            Err(GuessError::Input(reason)) => {
                debug!(target: "game_engine", "Rejected guess '{}': {}", input, reason);
                self.emit(GameEngineEvent::GuessRejected(reason));
                Err(GuessError::Input(reason))
            }
            Err(err) => Err(err),
        }
    }

    /// Reveals a random hidden letter. Returns the letter revealed.
    pub fn hint(&mut self) -> Result<char, GuessError> {
        let now = self.clock.now();
        let round = self.round.as_mut().ok_or(GuessError::NoActiveRound)?;
        if round.status() != RoundStatus::Playing {
            return Err(GuessError::NotPlaying(round.status()));
        }
        let hidden = round.hidden_letters();
        let Some(&letter) = hidden.choose(&mut self.rng) else {
            return Err(GuessError::NotPlaying(round.status()));
        };
        let outcome = round.hint(letter, now)?;
        if let Mode::Practice(practice) = &mut self.mode {
            practice.record_hint();
        }
        debug!(target: "game_engine", "Hint revealed '{}'", letter);
        self.after_guess(outcome, now);
        Ok(letter)
    }

    fn after_guess(&mut self, outcome: GuessOutcome, now: SystemTime) {
        self.emit_round_updated();
        if outcome.is_terminal() {
            self.finish_round(now);
        }
    }

    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        let paused = self.round.as_mut().is_some_and(|round| round.pause(now));
        if paused {
            if let Mode::Timed(timed) = &mut self.mode {
                if let Some(handle) = timed.countdown.take() {
                    self.scheduler.cancel(handle);
                }
            }
            self.emit_round_updated();
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        let resumed = self.round.as_mut().is_some_and(|round| round.resume(now));
        if resumed {
            if let Mode::Timed(timed) = &mut self.mode {
                timed.countdown = Some(self.scheduler.schedule_repeating(
                    now,
                    COUNTDOWN_INTERVAL,
                    ScheduledTask::CountdownTick,
                ));
            }
            self.emit_round_updated();
        }
        resumed
    }

    /// Abandons the round. Nothing is scored or recorded.
    pub fn quit(&mut self) -> bool {
        let now = self.clock.now();
        let quit = self.round.as_mut().is_some_and(|round| round.quit(now));
        if quit {
            self.cancel_scheduled();
            info!(target: "game_engine", "Round quit");
            self.emit_round_updated();
        }
        quit
    }

    /// Runs every scheduled task due by now, one at a time.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        while let Some((_, task)) = self.scheduler.pop_due(now) {
            self.run_task(task, now);
        }
    }

    fn run_task(&mut self, task: ScheduledTask, now: SystemTime) {
        match task {
            ScheduledTask::CountdownTick => self.countdown_tick(now),
            ScheduledTask::AutoContinue { round_id } => {
                if !self.is_finished_round(round_id) {
                    warn!(target: "game_engine", "Ignoring stale auto-continue for {}", round_id);
                    return;
                }
                if matches!(&self.mode, Mode::Practice(p) if p.config().endless) {
                    let _ = self.reset();
                }
            }
            ScheduledTask::AutoAdvance { round_id } => {
                if !self.is_finished_round(round_id) {
                    warn!(target: "game_engine", "Ignoring stale auto-advance for {}", round_id);
                    return;
                }
                if matches!(&self.mode, Mode::Multiplayer(session) if !session.is_ended()) {
                    let _ = self.reset();
                }
            }
        }
    }

    fn is_finished_round(&self, round_id: Uuid) -> bool {
        self.round
            .as_ref()
            .is_some_and(|round| round.playthrough_id() == round_id && round.status().is_finished_game())
    }

    fn countdown_tick(&mut self, now: SystemTime) {
        let playing = self
            .round
            .as_ref()
            .is_some_and(|round| round.status() == RoundStatus::Playing);
        let Mode::Timed(timed) = &mut self.mode else {
            return;
        };
        if !playing {
            return;
        }
        let expired = timed.tick(COUNTDOWN_INTERVAL);
        let remaining = timed.time_remaining();
        if expired {
            if let Some(handle) = timed.countdown.take() {
                self.scheduler.cancel(handle);
            }
        }
        self.emit(GameEngineEvent::TimerTick { remaining });
        if !expired {
            return;
        }
        info!(target: "game_engine", "Time is up");
        if self.round.as_mut().is_some_and(|round| round.expire(now)) {
            self.emit_round_updated();
            self.finish_round(now);
        }
    }

    /// Scoring, then progression, then achievements, then statistics. The
    /// mode decides what happens next.
    fn finish_round(&mut self, now: SystemTime) {
        if let Mode::Timed(timed) = &mut self.mode {
            if let Some(handle) = timed.countdown.take() {
                self.scheduler.cancel(handle);
            }
        }
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let status = round.status();
        let won = status == RoundStatus::Won;
        let elapsed = round.elapsed(now);

        let score = if won {
            score_win(&ScoreInput {
                difficulty: round.difficulty(),
                max_incorrect: round.max_incorrect(),
                incorrect_count: round.incorrect_count(),
                timing: self.mode.timing(elapsed),
                penalty_multiplier: self.mode.penalty_multiplier(),
            })
            .total
        } else {
            0
        };

        let record = GameStats {
            playthrough_id: round.playthrough_id(),
            word: round.word().to_string(),
            difficulty: round.difficulty(),
            category: round.category().to_string(),
            mode: self.mode.kind(),
            won,
            correct_guesses: round.correct_count(),
            incorrect_guesses: round.incorrect_count(),
            hints_used: round.hints_used(),
            score,
            completion_time: elapsed,
            finished_at: now,
        };
        self.session_score += u64::from(score);

        let mut promoted_to = None;
        if self.mode.tracks_progression() {
            if won {
                promoted_to = self.progression.record_win(self.difficulty);
                if promoted_to.is_some() {
                    self.pending_promotion = promoted_to;
                }
            } else {
                self.progression.record_loss();
            }
        }

        let mut newly_unlocked = Vec::new();
        if won && self.mode.tracks_achievements() {
            let projected = self.stats.project(&record);
            let context = AchievementContext {
                games_won: projected.games_won,
                current_streak: projected.current_streak,
                incorrect_guesses: record.incorrect_guesses,
                completion_time: record.completion_time,
                difficulty: record.difficulty,
                categories_played: projected.categories_played(),
                total_score: projected.total_score,
            };
            newly_unlocked = self.achievements.evaluate(&context, now);
            if !newly_unlocked.is_empty() {
                let result = self.achievements.save(self.store.as_mut());
                self.note_storage(result);
            }
        }

        self.stats.record_game(&record);
        let result = self.stats.save(self.store.as_mut());
        self.note_storage(result);

        let mut session_summary = None;
        match &mut self.mode {
            Mode::Practice(practice) => {
                practice.record_result(&record.category, &record.word, won, record.incorrect_guesses);
                if practice.config().endless {
                    practice.auto_continue = Some(self.scheduler.schedule_once(
                        now,
                        self.settings.auto_continue_delay,
                        ScheduledTask::AutoContinue {
                            round_id: record.playthrough_id,
                        },
                    ));
                }
            }
            Mode::Timed(timed) => {
                let time_used = timed.time_used();
                if won && timed.record_win(record.difficulty, &record.category, time_used) {
                    let result = timed.save_best_times(self.store.as_mut());
                    if let Err(err) = result {
                        self.persistence_degraded = true;
                        error!(target: "game_engine", "Could not save best times: {}", err);
                        self.game_engine_event_emitter
                            .emit_owned(GameEngineEvent::PersistenceDegraded(err));
                    }
                }
            }
            Mode::Multiplayer(session) => {
                if session.record_round(won, score) {
                    session_summary = Some(session.summary());
                } else {
                    session.auto_advance = Some(self.scheduler.schedule_once(
                        now,
                        self.settings.auto_advance_delay,
                        ScheduledTask::AutoAdvance {
                            round_id: record.playthrough_id,
                        },
                    ));
                }
            }
            Mode::Normal => {}
        }

        info!(
            target: "game_engine",
            "Round over: {:?} '{}' for {} points",
            status, record.word, score
        );
        self.emit(GameEngineEvent::RoundFinished(RoundSummary {
            status,
            word: record.word,
            difficulty: record.difficulty,
            category: record.category,
            score,
            newly_unlocked,
            promoted_to,
            completion_time: elapsed,
        }));
        if let Some(summary) = session_summary {
            self.emit(GameEngineEvent::SessionEnded(summary));
        }
    }

    fn cancel_scheduled(&mut self) {
        self.scheduler.cancel_all();
        match &mut self.mode {
            Mode::Practice(practice) => practice.auto_continue = None,
            Mode::Timed(timed) => timed.countdown = None,
            Mode::Multiplayer(session) => session.auto_advance = None,
            Mode::Normal => {}
        }
    }

    fn note_storage(&mut self, result: Result<(), StorageError>) {
        if let Err(err) = result {
            error!(target: "game_engine", "Persistence failed, continuing in memory: {}", err);
            self.persistence_degraded = true;
            self.emit(GameEngineEvent::PersistenceDegraded(err));
        }
    }

    fn save_settings(&mut self) {
        let result = self.settings.save(self.store.as_mut());
        self.note_storage(result);
    }

    fn switch_mode(&mut self, mode: Mode) {
        self.cancel_scheduled();
        self.mode = mode;
        info!(target: "game_engine", "Mode is now {}", self.mode.kind());
        self.emit(GameEngineEvent::ModeChanged(self.mode.kind()));
    }

    pub fn enable_practice_mode(
        &mut self,
        config: PracticeConfig,
    ) -> Result<GameStateSnapshot, SelectionError> {
        self.switch_mode(Mode::Practice(PracticeState::new(config)));
        self.reset()
    }

    /// A zero limit falls back to the configured default.
    pub fn enable_timed_mode(
        &mut self,
        time_limit: Duration,
    ) -> Result<GameStateSnapshot, SelectionError> {
        let time_limit = if time_limit.is_zero() {
            self.settings.default_time_limit
        } else {
            time_limit
        };
        let mut timed = TimedState::new(time_limit);
        if let Some(repair) = timed.load_best_times(self.store.as_mut()) {
            warn!(target: "game_engine", "Best times reset: {}", repair);
            self.emit(GameEngineEvent::DataRepaired(repair));
        }
        self.switch_mode(Mode::Timed(timed));
        self.reset()
    }

    pub fn enable_multiplayer_mode<S: AsRef<str>>(
        &mut self,
        players: &[S],
        total_rounds: Option<u32>,
    ) -> Result<GameStateSnapshot, ModeError> {
        let session = MultiplayerSession::new(players, total_rounds).ok_or(ModeError::NoPlayers)?;
        self.switch_mode(Mode::Multiplayer(session));
        Ok(self.reset()?)
    }

    /// Back to normal rules. The current round keeps going untimed.
    pub fn disable_mode(&mut self) {
        if matches!(self.mode, Mode::Normal) {
            return;
        }
        self.switch_mode(Mode::Normal);
        self.emit_round_updated();
    }

    /// Applies from the next round on.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.pending_promotion = None;
        self.settings.difficulty = difficulty;
        self.save_settings();
        self.emit(GameEngineEvent::DifficultyChanged(difficulty));
    }

    /// Applies from the next round on.
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim().to_lowercase();
        self.category = category.clone();
        self.settings.category = category.clone();
        self.save_settings();
        self.emit(GameEngineEvent::CategoryChanged(category));
    }

    pub fn reset_achievements(&mut self) {
        self.achievements.reset();
        let result = self.achievements.save(self.store.as_mut());
        self.note_storage(result);
        self.emit(GameEngineEvent::AchievementsReset);
    }

    pub fn reset_statistics(&mut self) {
        self.stats.reset();
        let result = self.stats.save(self.store.as_mut());
        self.note_storage(result);
        self.emit(GameEngineEvent::StatisticsReset);
    }

    pub fn reset_progression(&mut self) {
        self.progression.reset();
        self.pending_promotion = None;
    }

    /// Seeds word selection and hints, for reproducible sessions.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn snapshot_of(&self, round: &GameState, now: SystemTime) -> GameStateSnapshot {
        let status = round.status();
        GameStateSnapshot::new(
            round.playthrough_id(),
            round.masked_word(),
            status.is_terminal().then(|| round.word().to_string()),
            round.difficulty(),
            round.category().to_string(),
            self.mode.kind(),
            status,
            round.guessed_letters().iter().copied().collect(),
            round.incorrect_guesses().to_vec(),
            round.max_incorrect(),
            round.hints_used(),
            round.elapsed(now),
            self.mode.timed().map(TimedState::time_remaining),
            self.mode
                .multiplayer()
                .map(|session| session.current_player().name.clone()),
        )
    }

    pub fn round_snapshot(&self) -> Option<GameStateSnapshot> {
        let round = self.round.as_ref()?;
        Some(self.snapshot_of(round, self.clock.now()))
    }

    pub fn statistics(&self) -> &GlobalStats {
        self.stats.global_stats()
    }

    pub fn achievements(&self) -> &AchievementSet {
        self.achievements.achievements()
    }

    pub fn insights(&self) -> Insights {
        self.stats.insights()
    }

    pub fn weekly_rollup(&self, date: NaiveDate) -> Option<PeriodRollup> {
        self.stats.weekly_rollup(date)
    }

    pub fn monthly_rollup(&self, year: i32, month: u32) -> Option<PeriodRollup> {
        self.stats.monthly_rollup(year, month)
    }

    pub fn high_scores(&self, difficulty: Difficulty, limit: usize) -> Vec<GameStats> {
        self.stats.get_high_scores(difficulty, limit)
    }

    pub fn export_statistics(&self) -> Result<String, serde_json::Error> {
        self.stats.export_json()
    }

    /// Reads the stored record when timed mode is not active.
    pub fn best_time(&mut self, difficulty: Difficulty, category: &str) -> Option<Duration> {
        if let Some(timed) = self.mode.timed() {
            return timed.best_times().get(difficulty, category);
        }
        storage::load_json(self.store.as_mut(), BEST_TIMES_KEY, |_: &BestTimes| Ok(()))
            .ok()
            .flatten()
            .and_then(|best_times| best_times.get(difficulty, category))
    }

    pub fn multiplayer_session(&self) -> Option<&MultiplayerSession> {
        self.mode.multiplayer()
    }

    pub fn practice_mastery(&self) -> Option<&BTreeMap<String, CategoryMastery>> {
        self.mode.practice().map(PracticeState::mastery)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn consecutive_wins(&self) -> u32 {
        self.progression.consecutive_wins()
    }

    pub fn session_score(&self) -> u64 {
        self.session_score
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    pub fn has_scheduled_tasks(&self) -> bool {
        !self.scheduler.is_empty()
    }
}
