//! Common error types for SBO services

use thiserror::Error;

/// Common result type for SBO operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SBO services
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied no usable input (missing identifier, self-merge, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested record or customer does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cross-tenant reference detected
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A uniqueness invariant would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Reclassify unique-index violations as `Conflict`.
    ///
    /// SQLite reports them as database errors; batch callers need to tell
    /// them apart from storage failures to isolate the row instead of
    /// aborting the batch.
    pub fn classify_unique_violation(self, context: &str) -> Self {
        match self {
            Error::Database(sqlx::Error::Database(ref db_err))
                if db_err.is_unique_violation() =>
            {
                Error::Conflict(format!("{}: {}", context, db_err))
            }
            other => other,
        }
    }
}
