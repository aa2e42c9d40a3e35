//! Error types for feedbeat.

use thiserror::Error;

/// Common error type for feedbeat.
#[derive(Error, Debug)]
pub enum FeedbeatError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database error.
    ///
    /// Wraps errors from the storage backend; sqlx errors are converted
    /// automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure while fetching a feed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// A feed document could not be parsed.
    #[error("feed parse error: {0}")]
    Parse(String),

    /// A feed document is neither RSS 2.0 nor Atom.
    #[error("invalid feed format")]
    UnsupportedFormat,

    /// A subscription has no URL.
    #[error("no url supplied")]
    EmptyUrl,

    /// Notification delivery failure.
    #[error("notification error: {0}")]
    Notify(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),
}

impl From<sqlx::Error> for FeedbeatError {
    fn from(e: sqlx::Error) -> Self {
        FeedbeatError::Database(e.to_string())
    }
}

/// Result type alias for feedbeat operations.
pub type Result<T> = std::result::Result<T, FeedbeatError>;
