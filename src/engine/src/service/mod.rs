pub mod game_manager;
pub mod match_controller;
pub mod move_source;
pub mod resolver;
