//! Error types for the voice chat front end

use thiserror::Error;

/// Result type alias for voice chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside a single chat turn
///
/// Failures inside a turn are reported as [`crate::orchestrator::TurnError`]
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio encoding or decoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// Web server error
    #[error("server error: {0}")]
    Server(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
