//! Common error types for cinedex

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the cinedex crates
#[derive(Error, Debug)]
pub enum Error {
    /// Payload rejected during validation; names the first offending field
    #[error("Invalid payload at `{path}`: expected {expected}")]
    Validation { path: String, expected: String },

    /// Concurrent write collision; the operation may be retried as-is
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a validation error for the given field path
    pub fn validation(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Whether the failed operation is safe to retry unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::WriteConflict(_))
    }
}

// SQLite busy/locked result codes. Statements rejected with these have not
// been applied, so they classify as retryable write conflicts alongside
// unique-constraint races.
const SQLITE_BUSY_CODES: [&str; 4] = ["5", "6", "261", "517"];

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let busy = matches!(db_err.code().as_deref(), Some(code) if SQLITE_BUSY_CODES.contains(&code));
            if db_err.is_unique_violation() || busy {
                return Error::WriteConflict(db_err.message().to_string());
            }
        }
        Error::Database(err)
    }
}
