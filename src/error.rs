//! Error types for sweep execution.

use thiserror::Error;

/// Result type alias for sweep operations.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Errors that can occur while executing a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Sweep mode string outside the recognized set.
    #[error("invalid sweep mode: {0}")]
    InvalidMode(String),

    /// Directory or manifest I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decision-boundary image could not be written.
    #[error("render error: {0}")]
    Render(String),
}
