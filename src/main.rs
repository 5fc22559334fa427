use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use hangword::clock::{Clock, SystemClock};
use hangword::destroyable::Destroyable;
use hangword::events::Channel;
use hangword::game::{
    GameEngine, JsonFileCatalogProvider, StaticCatalogProvider, WordCatalogProvider,
};
use hangword::helpers::{millis, Capitalize};
use hangword::model::{
    Difficulty, GameEngineCommand, GameEngineEvent, GameStateSnapshot, PracticeConfig,
};
use hangword::storage::{FileStore, MemoryStore, PersistenceStore};
use log::warn;

const HELP: &str = "\
letters        guess a letter
:hint          reveal a letter
:pause :resume :quit :new
:difficulty X  easy, medium or hard (next round)
:category X    word category (next round)
:practice [endless] [norepeat]
:timed [secs]
:multi ana,ben [rounds]
:normal        leave the current mode
:stats :achievements :insights :export
:exit";

fn init_logging() {
    env_logger::init();
}

fn open_store(clock: Rc<dyn Clock>) -> Box<dyn PersistenceStore> {
    match FileStore::new(FileStore::default_data_dir()) {
        Ok(store) => Box::new(store.with_clock(clock)),
        Err(err) => {
            warn!(target: "main", "Data directory unavailable ({}), progress will not be saved", err);
            Box::new(MemoryStore::new().with_clock(clock))
        }
    }
}

fn print_round(snapshot: &GameStateSnapshot) {
    let spaced: Vec<String> = snapshot.masked_word.chars().map(String::from).collect();
    print!(
        "{}  [{} / {}]  {} misses left",
        spaced.join(" "),
        snapshot.difficulty,
        snapshot.category.capitalize(),
        snapshot.remaining_mistakes()
    );
    if let Some(remaining) = snapshot.time_remaining {
        print!("  {}s left", millis(remaining) / 1000);
    }
    if let Some(player) = &snapshot.current_player {
        print!("  ({player})");
    }
    println!();
}

fn print_event(event: &GameEngineEvent) {
    match event {
        GameEngineEvent::RoundStarted(snapshot) | GameEngineEvent::RoundUpdated(snapshot) => {
            print_round(snapshot)
        }
        GameEngineEvent::GuessRejected(reason) => println!("! {reason}"),
        GameEngineEvent::RoundFinished(summary) => {
            println!(
                "{:?}: the word was '{}' ({} points, {:.1}s)",
                summary.status,
                summary.word,
                summary.score,
                summary.completion_time.as_secs_f64()
            );
            for kind in &summary.newly_unlocked {
                println!("* Achievement unlocked: {}", kind.title());
            }
            if let Some(next) = summary.promoted_to {
                println!("* Promoted to {next} from the next round");
            }
        }
        GameEngineEvent::TimerTick { remaining } => {
            let ms = millis(*remaining);
            if ms % 10_000 == 0 && ms > 0 {
                println!("{}s left", ms / 1000);
            }
        }
        GameEngineEvent::DifficultyChanged(difficulty) => println!("Difficulty: {difficulty}"),
        GameEngineEvent::CategoryChanged(category) => println!("Category: {}", category.capitalize()),
        GameEngineEvent::ModeChanged(kind) => println!("Mode: {kind}"),
        GameEngineEvent::PlayerTurn { name, .. } => println!("{name}'s turn"),
        GameEngineEvent::SessionEnded(summary) => {
            for (rank, player) in summary.rankings.iter().enumerate() {
                println!("{}. {} {} pts, {} wins", rank + 1, player.name, player.score, player.wins);
            }
            println!("Winner(s): {}", summary.winners.join(", "));
        }
        GameEngineEvent::SelectionFailed(err) => println!("! {err}"),
        GameEngineEvent::OfflineModeChanged(true) => println!("Using built-in words"),
        GameEngineEvent::PersistenceDegraded(err) => println!("! progress not saved: {err}"),
        GameEngineEvent::DataRepaired(err) => println!("! {err}, starting fresh"),
        _ => (),
    }
}

fn parse_command(line: &str) -> Result<Option<GameEngineCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    if !head.starts_with(':') {
        return Ok(Some(GameEngineCommand::Guess(line.to_string())));
    }
    let rest: Vec<&str> = words.collect();
    let command = match head {
        ":hint" => GameEngineCommand::Hint,
        ":pause" => GameEngineCommand::Pause,
        ":resume" => GameEngineCommand::Resume,
        ":quit" => GameEngineCommand::Quit,
        ":new" => GameEngineCommand::Reset,
        ":normal" => GameEngineCommand::DisableMode,
        ":difficulty" => {
            let difficulty: Difficulty = rest.join(" ").parse().map_err(|e| format!("{e}"))?;
            GameEngineCommand::SetDifficulty(difficulty)
        }
        ":category" => GameEngineCommand::SetCategory(rest.join(" ")),
        ":practice" => GameEngineCommand::EnablePracticeMode(PracticeConfig {
            endless: rest.contains(&"endless"),
            allow_repeats: !rest.contains(&"norepeat"),
            ..PracticeConfig::default()
        }),
        ":timed" => {
            let secs = match rest.first() {
                Some(secs) => secs.parse::<u64>().map_err(|e| format!("{e}"))?,
                None => 0,
            };
            GameEngineCommand::EnableTimedMode(Duration::from_secs(secs))
        }
        ":multi" => {
            let players = rest
                .first()
                .map(|names| names.split(',').map(str::to_string).collect())
                .unwrap_or_default();
            let total_rounds = match rest.get(1) {
                Some(rounds) => Some(rounds.parse::<u32>().map_err(|e| format!("{e}"))?),
                None => None,
            };
            GameEngineCommand::EnableMultiplayerMode {
                players,
                total_rounds,
            }
        }
        other => return Err(format!("unknown command {other}")),
    };
    Ok(Some(command))
}

fn main() {
    init_logging();

    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let provider: Box<dyn WordCatalogProvider> = match JsonFileCatalogProvider::from_env() {
        Some(provider) => Box::new(provider),
        None => Box::new(StaticCatalogProvider::builtin()),
    };

    let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
    let (command_emitter, command_observer) = Channel::<GameEngineCommand>::new();
    event_observer.subscribe(print_event);

    let engine = GameEngine::new(
        open_store(clock.clone()),
        provider.as_ref(),
        clock,
        event_emitter,
    )
    .wire(&command_observer);

    println!("{HELP}");
    command_emitter.emit(&GameEngineCommand::Reset);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        command_emitter.emit(&GameEngineCommand::Tick);

        match line.trim() {
            ":exit" => break,
            ":help" => println!("{HELP}"),
            ":stats" => {
                let engine = engine.borrow();
                let stats = engine.statistics();
                println!(
                    "played {} won {} ({:.0}%) streak {} best {} score {}",
                    stats.games_played,
                    stats.games_won,
                    stats.win_rate(),
                    stats.current_streak,
                    stats.best_streak,
                    stats.total_score
                );
                for record in engine.high_scores(engine.difficulty(), 5) {
                    println!("  {} {} pts", record.word, record.score);
                }
            }
            ":achievements" => {
                for (kind, status) in engine.borrow().achievements().iter() {
                    let mark = if status.unlocked { "x" } else { " " };
                    println!("[{mark}] {}: {}", kind.title(), kind.description());
                }
            }
            ":insights" => {
                let insights = engine.borrow().insights();
                for line in insights
                    .strengths
                    .iter()
                    .chain(&insights.improvements)
                    .chain(&insights.recommendations)
                {
                    println!("- {line}");
                }
            }
            ":export" => match engine.borrow().export_statistics() {
                Ok(json) => println!("{json}"),
                Err(err) => println!("! {err}"),
            },
            line => match parse_command(line) {
                Ok(Some(command)) => command_emitter.emit(&command),
                Ok(None) => (),
                Err(err) => println!("! {err}"),
            },
        }
    }

    engine.borrow_mut().destroy();
}
