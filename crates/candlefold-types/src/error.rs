//! Error types for candlefold.

use thiserror::Error;

use crate::IntervalParseError;

/// Result type alias for candlefold operations.
pub type Result<T> = std::result::Result<T, CandlefoldError>;

/// Errors that can occur while loading, merging and rendering candle data.
#[derive(Error, Debug)]
pub enum CandlefoldError {
    /// Historical data could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Wire data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A decimal string could not be parsed.
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    /// An interval string could not be parsed.
    #[error(transparent)]
    Interval(#[from] IntervalParseError),

    /// The render adapter rejected an update.
    #[error("Render error: {0}")]
    Render(String),

    /// The session is no longer running.
    #[error("Session closed")]
    SessionClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
