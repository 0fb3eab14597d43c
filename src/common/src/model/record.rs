use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::GameError,
    model::{
        game::{PlayerOutcome, Side},
        id::Id,
    },
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    VsAi,
    Local,
    AiVsAi,
}

impl Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchMode::VsAi => "vs_ai",
            MatchMode::Local => "local",
            MatchMode::AiVsAi => "ai_vs_ai",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for MatchMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "vs_ai" => Ok(MatchMode::VsAi),
            "local" => Ok(MatchMode::Local),
            "ai_vs_ai" => Ok(MatchMode::AiVsAi),
            _ => Err(GameError::InvalidConfig(format!("unknown match mode {s:?}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EndCondition {
    FirstTo { wins: u32 },
    FixedRounds { rounds: u32 },
}

impl Default for EndCondition {
    fn default() -> Self {
        EndCondition::FirstTo { wins: 3 }
    }
}

impl EndCondition {
    pub fn validate(&self) -> Result<(), GameError> {
        match self {
            EndCondition::FirstTo { wins: 0 } => Err(GameError::InvalidConfig(
                "win target must be at least 1".to_owned(),
            )),
            EndCondition::FixedRounds { rounds: 0 } => Err(GameError::InvalidConfig(
                "round count must be at least 1".to_owned(),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_met(&self, scores: (u32, u32), rounds_played: u32) -> bool {
        match *self {
            EndCondition::FirstTo { wins } => scores.0 >= wins || scores.1 >= wins,
            EndCondition::FixedRounds { rounds } => rounds_played >= rounds,
        }
    }
}

impl Display for EndCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndCondition::FirstTo { wins } => write!(f, "first to {}", wins),
            EndCondition::FixedRounds { rounds } => write!(f, "{} rounds", rounds),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: Id,
    pub mode: MatchMode,
    pub player_a: String,
    pub player_b: String,
    pub scores: (u32, u32),
    pub draws: u32,
    pub rounds: u32,
    pub winner: Option<Side>,
    pub end_condition: EndCondition,
    pub finished_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn name_of(&self, side: Side) -> &str {
        match side {
            Side::A => &self.player_a,
            Side::B => &self.player_b,
        }
    }

    pub fn side_of(&self, name: &str) -> Option<Side> {
        if self.player_a == name {
            Some(Side::A)
        } else if self.player_b == name {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|side| self.name_of(side))
    }

    pub fn outcome_for(&self, name: &str) -> Option<PlayerOutcome> {
        let side = self.side_of(name)?;
        Some(match self.winner {
            None => PlayerOutcome::Draw,
            Some(winner) if winner == side => PlayerOutcome::Win,
            Some(_) => PlayerOutcome::Loss,
        })
    }

    pub fn description(&self) -> String {
        let verdict = match self.winner {
            Some(side) => format!(
                "{} Win vs {}",
                self.name_of(side),
                self.name_of(side.other())
            ),
            None => format!("Draw between {} and {}", self.player_a, self.player_b),
        };
        format!(
            "{} {} ({}-{}, {})",
            self.finished_at.format("%H:%M"),
            verdict,
            self.scores.0,
            self.scores.1,
            self.end_condition
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl PlayerStats {
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.wins as f64 / total as f64,
        }
    }
}
