use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{input:?} is not a move, expected rock, paper or scissors")]
    InvalidMove { input: String },

    #[error("match abandoned before it finished")]
    MatchAbandoned,

    #[error("player name must not be empty")]
    EmptyIdentity,

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}
