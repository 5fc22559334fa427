use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    #[default]
    Playing,
    Paused,
    Won,
    Lost,
    Quit,
}

impl RoundStatus {
    /// Won, Lost and Quit are frozen until the next reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundStatus::Won | RoundStatus::Lost | RoundStatus::Quit)
    }

    pub fn is_finished_game(&self) -> bool {
        matches!(self, RoundStatus::Won | RoundStatus::Lost)
    }
}
