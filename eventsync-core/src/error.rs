//! Error types for eventsync.

use thiserror::Error;

/// Errors that can occur while filtering and synchronizing events.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search terms error: {0}")]
    SearchTerms(String),

    #[error("Invalid date window '{start}' .. '{end}', expected YYYY-MM-DD")]
    InvalidWindow { start: String, end: String },

    #[error("Invalid event date '{0}'")]
    InvalidDate(String),

    #[error("Invalid time of day '{0}'")]
    InvalidTime(String),

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Remote calendar error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias for eventsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
