pub mod api;
pub mod database;
pub mod entrypoint;
pub mod error;
pub mod store;

pub use database::Database;
pub use error::StoreError;
pub use store::{Leaderboard, OrderBy, Standing};
