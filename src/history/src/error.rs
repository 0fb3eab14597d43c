use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("malformed end condition: {0}")]
    EndCondition(#[from] serde_json::Error),

    #[error("malformed timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("malformed {column} value {value:?}")]
    Malformed { column: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
