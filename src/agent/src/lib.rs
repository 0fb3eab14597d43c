pub mod bot;
pub mod strategy;

pub use bot::Bot;
pub use strategy::{Difficulty, Round, Strategy, StrategyConfig};
