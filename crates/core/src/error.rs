//! Crate-wide error type
//!
//! Every crate keeps its own `thiserror` enum and converts into this one at the
//! boundary, so the agent and server only deal with a single error type.

use thiserror::Error;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Action server error: {0}")]
    Action(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
