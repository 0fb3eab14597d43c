pub mod events;
pub mod player;
