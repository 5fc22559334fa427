use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::TimestampMilliSeconds;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    FirstWin,
    Streak5,
    Streak10,
    PerfectGame,
    SpeedDemon,
    DifficultyMaster,
    CategoryExplorer,
    ScoreHunter,
}

impl AchievementKind {
    pub fn all() -> [AchievementKind; 8] {
        [
            AchievementKind::FirstWin,
            AchievementKind::Streak5,
            AchievementKind::Streak10,
            AchievementKind::PerfectGame,
            AchievementKind::SpeedDemon,
            AchievementKind::DifficultyMaster,
            AchievementKind::CategoryExplorer,
            AchievementKind::ScoreHunter,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            AchievementKind::FirstWin => "firstWin",
            AchievementKind::Streak5 => "streak5",
            AchievementKind::Streak10 => "streak10",
            AchievementKind::PerfectGame => "perfectGame",
            AchievementKind::SpeedDemon => "speedDemon",
            AchievementKind::DifficultyMaster => "difficultyMaster",
            AchievementKind::CategoryExplorer => "categoryExplorer",
            AchievementKind::ScoreHunter => "scoreHunter",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::FirstWin => "First Win",
            AchievementKind::Streak5 => "On a Roll",
            AchievementKind::Streak10 => "Unstoppable",
            AchievementKind::PerfectGame => "Flawless",
            AchievementKind::SpeedDemon => "Speed Demon",
            AchievementKind::DifficultyMaster => "Difficulty Master",
            AchievementKind::CategoryExplorer => "Category Explorer",
            AchievementKind::ScoreHunter => "Score Hunter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementKind::FirstWin => "Win your first game",
            AchievementKind::Streak5 => "Win 5 games in a row",
            AchievementKind::Streak10 => "Win 10 games in a row",
            AchievementKind::PerfectGame => "Win without a wrong guess",
            AchievementKind::SpeedDemon => "Win in under 15 seconds",
            AchievementKind::DifficultyMaster => "Win on hard",
            AchievementKind::CategoryExplorer => "Play 5 different categories",
            AchievementKind::ScoreHunter => "Reach 1000 total points",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub unlocked: bool,
    #[serde_as(as = "Option<TimestampMilliSeconds<i64>>")]
    #[serde(default)]
    pub unlocked_at: Option<SystemTime>,
}

/// All eight achievements, always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSet {
    entries: BTreeMap<AchievementKind, AchievementStatus>,
}

impl Default for AchievementSet {
    fn default() -> Self {
        Self {
            entries: AchievementKind::all()
                .into_iter()
                .map(|kind| (kind, AchievementStatus::default()))
                .collect(),
        }
    }
}

impl AchievementSet {
    pub fn is_unlocked(&self, kind: AchievementKind) -> bool {
        self.entries.get(&kind).is_some_and(|s| s.unlocked)
    }

    pub fn status(&self, kind: AchievementKind) -> AchievementStatus {
        self.entries.get(&kind).cloned().unwrap_or_default()
    }

    /// Returns false when already unlocked; the original timestamp is kept.
    pub fn unlock(&mut self, kind: AchievementKind, at: SystemTime) -> bool {
        let status = self.entries.entry(kind).or_default();
        if status.unlocked {
            return false;
        }
        status.unlocked = true;
        status.unlocked_at = Some(at);
        true
    }

    pub fn unlocked(&self) -> Vec<AchievementKind> {
        self.entries
            .iter()
            .filter(|(_, s)| s.unlocked)
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AchievementKind, &AchievementStatus)> {
        self.entries.iter()
    }

    /// Shape check for data read back from storage.
    pub fn validate(&self) -> Result<(), String> {
        for kind in AchievementKind::all() {
            match self.entries.get(&kind) {
                None => return Err(format!("missing achievement {kind}")),
                Some(s) if s.unlocked && s.unlocked_at.is_none() => {
                    return Err(format!("{kind} unlocked without timestamp"))
                }
                Some(s) if !s.unlocked && s.unlocked_at.is_some() => {
                    return Err(format!("{kind} locked but carries a timestamp"))
                }
                Some(_) => {}
            }
        }
        if self.entries.len() != AchievementKind::all().len() {
            return Err("unexpected achievement entries".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unlock_is_idempotent_and_keeps_first_timestamp() {
        let mut set = AchievementSet::default();
        let first = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let later = first + Duration::from_secs(10);
        assert!(set.unlock(AchievementKind::FirstWin, first));
        assert!(!set.unlock(AchievementKind::FirstWin, later));
        assert_eq!(set.status(AchievementKind::FirstWin).unlocked_at, Some(first));
        assert_eq!(set.unlocked(), vec![AchievementKind::FirstWin]);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let set = AchievementSet::default();
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"difficultyMaster\""));
        assert!(json.contains("\"streak10\""));
        let back: AchievementSet = serde_json::from_str(&json).unwrap();
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_entries() {
        let json = r#"{"entries": {"firstWin": {"unlocked": false}}}"#;
        let partial: AchievementSet = serde_json::from_str(json).unwrap();
        assert!(partial.validate().is_err());
    }
}
