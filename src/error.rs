//! Error types for Streakline

use thiserror::Error;

/// Errors that can occur while computing habit statistics
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid export document: {0}")]
    InvalidExport(String),

    #[error("Unknown habit: {0}")]
    UnknownHabit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
