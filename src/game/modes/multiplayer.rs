use itertools::Itertools;
use log::info;

use crate::game::scheduler::TaskHandle;
use crate::model::{Player, SessionSummary};

/// Local pass-and-play session. Players take one round each in turn.
#[derive(Debug)]
pub struct MultiplayerSession {
    players: Vec<Player>,
    current_player_index: usize,
    rounds_played: u32,
    total_rounds: Option<u32>,
    ended: bool,
    pub(crate) auto_advance: Option<TaskHandle>,
}

impl MultiplayerSession {
    /// Blank names are dropped; `None` when nobody is left to play.
    pub fn new<S: AsRef<str>>(names: &[S], total_rounds: Option<u32>) -> Option<Self> {
        let players: Vec<Player> = names
            .iter()
            .map(|name| Player::new(name.as_ref()))
            .filter(|player| !player.name.is_empty())
            .collect();
        if players.is_empty() {
            return None;
        }
        Some(Self {
            players,
            current_player_index: 0,
            rounds_played: 0,
            total_rounds: total_rounds.filter(|rounds| *rounds > 0),
            ended: false,
            auto_advance: None,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn total_rounds(&self) -> Option<u32> {
        self.total_rounds
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Credits the current player and reports whether the session is over.
    /// The check runs before the turn passes on, counting full rotations.
    pub fn record_round(&mut self, won: bool, score: u32) -> bool {
        let player = &mut self.players[self.current_player_index];
        player.score += u64::from(score);
        if won {
            player.wins += 1;
        }
        self.rounds_played += 1;

        let rotations = self.rounds_played / self.players.len() as u32;
        self.ended = self.total_rounds.is_some_and(|total| rotations >= total);
        self.ended
    }

    /// Same players and round count, fresh scores.
    pub fn restart(&mut self) {
        for player in &mut self.players {
            player.score = 0;
            player.wins = 0;
        }
        self.current_player_index = 0;
        self.rounds_played = 0;
        self.ended = false;
        self.auto_advance = None;
    }

    /// Passes the turn to the next player. Returns the new index.
    pub fn advance(&mut self) -> usize {
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        self.current_player_index
    }

    pub fn summary(&self) -> SessionSummary {
        let rankings: Vec<Player> = self
            .players
            .iter()
            .sorted_by(|a, b| b.score.cmp(&a.score).then(b.wins.cmp(&a.wins)))
            .cloned()
            .collect();
        let winners: Vec<String> = match rankings.first() {
            Some(leader) => rankings
                .iter()
                .take_while(|p| p.score == leader.score && p.wins == leader.wins)
                .map(|p| p.name.clone())
                .collect(),
            None => Vec::new(),
        };
        info!(target: "multiplayer", "Session over after {} rounds, winners: {}", self.rounds_played, winners.join(", "));
        SessionSummary {
            rankings,
            winners,
            rounds_played: self.rounds_played,
        }
    }
}
