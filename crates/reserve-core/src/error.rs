//! Error types for reserve-core

use thiserror::Error;

/// Result type alias using reserve-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reserve-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record or user not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting user may not perform this change
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
