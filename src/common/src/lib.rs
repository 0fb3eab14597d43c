pub mod error;
pub mod model;
pub mod utility;

pub use error::GameError;
pub use model::game::{resolve, Move, Outcome, PlayerOutcome, Side};
pub use model::id::Id;
pub use model::record::{EndCondition, MatchMode, MatchRecord, PlayerStats};
