pub mod config;
pub mod entrypoint;
pub mod model;
pub mod scenario;
pub mod service;

pub use config::{ConfigError, SessionConfig};
pub use model::{
    events::{MatchEvent, RoundSummary},
    player::Player,
};
pub use service::{
    game_manager::{GameManager, MatchRequest, MatchSetup},
    match_controller::{MatchConfig, MatchController},
    move_source::{human, HumanHandle, MoveContext, MoveSource},
    resolver::{play_raw_round, play_round},
};
