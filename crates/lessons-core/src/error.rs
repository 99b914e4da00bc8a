//! Error types for the engine

use thiserror::Error;

/// Failures surfaced to callers. Duplicate and partial-correction outcomes
/// are not errors; see `ObserveOutcome`.
#[derive(Error, Debug)]
pub enum LessonsError {
    /// Summary below the minimum length
    #[error("summary must be at least {min} characters (got {len})")]
    SummaryTooShort { len: usize, min: usize },

    /// Request shape could not be interpreted
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LessonsError>;
