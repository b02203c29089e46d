//! Common error types for ankigen

use thiserror::Error;

/// Common result type for ankigen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across ankigen services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Word generation service call failed (timeout, quota, malformed response)
    #[error("Generation service error: {0}")]
    Generation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
