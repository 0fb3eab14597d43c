use std::{fs, path::Path};

use agent::{Difficulty, StrategyConfig};
use common::model::record::{EndCondition, MatchMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::game_manager::MatchRequest;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

// Settings for a terminal session. Every field may be left out of the JSON
// file; command line flags are applied on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: MatchMode,
    pub end_condition: EndCondition,
    pub player_1: Option<String>,
    pub player_2: Option<String>,
    pub strategy: StrategyConfig,
    pub seed: Option<u64>,
    pub db_url: Option<String>,
    pub history_limit: usize,
    pub round_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mode: MatchMode::VsAi,
            end_condition: EndCondition::default(),
            player_1: None,
            player_2: None,
            strategy: Difficulty::default().into(),
            seed: None,
            db_url: None,
            history_limit: history::api::DEFAULT_LIMIT,
            round_delay_ms: 0,
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn request(&self) -> MatchRequest {
        MatchRequest {
            mode: self.mode,
            names: (self.player_1.clone(), self.player_2.clone()),
            end_condition: self.end_condition,
            strategy: self.strategy.clone(),
            seed: self.seed,
        }
    }
}
