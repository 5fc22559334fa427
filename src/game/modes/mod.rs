//! Rule variants layered over the normal round. The engine matches on `Mode`
//! wherever a variant changes selection, scoring or what happens after a
//! round ends.

mod multiplayer;
mod practice;
mod timed;

use std::time::Duration;

pub use multiplayer::MultiplayerSession;
pub use practice::{CategoryMastery, PracticeState};
pub use timed::{BestTimes, TimedState, COUNTDOWN_INTERVAL};

use crate::game::scoring::Timing;
use crate::game::word_selector::SelectionFilters;
use crate::model::{Difficulty, ModeKind};

#[derive(Debug, Default)]
pub enum Mode {
    #[default]
    Normal,
    Practice(PracticeState),
    Timed(TimedState),
    Multiplayer(MultiplayerSession),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Normal => ModeKind::Normal,
            Mode::Practice(_) => ModeKind::Practice,
            Mode::Timed(_) => ModeKind::Timed,
            Mode::Multiplayer(_) => ModeKind::Multiplayer,
        }
    }

    pub fn tracks_progression(&self) -> bool {
        !matches!(self, Mode::Practice(_))
    }

    pub fn tracks_achievements(&self) -> bool {
        !matches!(self, Mode::Practice(_))
    }

    pub fn max_incorrect(&self, default: u32) -> u32 {
        match self {
            Mode::Practice(practice) => practice.max_incorrect(default),
            _ => default,
        }
    }

    pub fn difficulty(&self, requested: Difficulty) -> Difficulty {
        match self {
            Mode::Practice(practice) => practice.difficulty(requested),
            _ => requested,
        }
    }

    pub fn selection_filters(&mut self) -> SelectionFilters<'_> {
        match self {
            Mode::Practice(practice) => practice.selection_filters(),
            _ => SelectionFilters::unrestricted(),
        }
    }

    pub fn timing(&self, elapsed: Duration) -> Timing {
        match self {
            Mode::Timed(timed) => Timing::Countdown {
                remaining: timed.time_remaining(),
                limit: timed.time_limit(),
            },
            _ => Timing::Untimed { elapsed },
        }
    }

    pub fn penalty_multiplier(&self) -> Option<f64> {
        match self {
            Mode::Practice(practice) => Some(practice.penalty_multiplier()),
            _ => None,
        }
    }

    pub fn practice(&self) -> Option<&PracticeState> {
        match self {
            Mode::Practice(practice) => Some(practice),
            _ => None,
        }
    }

    pub fn timed(&self) -> Option<&TimedState> {
        match self {
            Mode::Timed(timed) => Some(timed),
            _ => None,
        }
    }

    pub fn multiplayer(&self) -> Option<&MultiplayerSession> {
        match self {
            Mode::Multiplayer(session) => Some(session),
            _ => None,
        }
    }
}
