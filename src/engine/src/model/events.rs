use common::model::game::{Move, Outcome};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub round: u32,
    pub moves: (Move, Move),
    pub outcome: Outcome,
    // Match scores after this round
    pub scores: (u32, u32),
    pub message: String,
}

// Pushed to the front end while a match runs
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum MatchEvent {
    PendingMove {
        round: u32,
    },
    RoundResult(RoundSummary),
    MatchResult {
        winner: Option<String>,
        scores: (u32, u32),
        rounds: u32,
    },
    Abandoned {
        rounds: u32,
    },
}
