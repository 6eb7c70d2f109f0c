use chrono::NaiveDate;
use thiserror::Error;

// Engine-level failures. All are reported synchronously to the caller;
// the engine has no I/O, so nothing is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("card not found: {0}")]
    NotFound(u64),

    #[error("activity date {new} is earlier than last recorded {last}")]
    Ordering { last: NaiveDate, new: NaiveDate },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// Failures from the caller-side persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("state encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
