//! Error types for text processing

use thiserror::Error;

/// Result type for text processing operations
pub type Result<T> = std::result::Result<T, TextProcessingError>;

#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Unsupported knowledge base format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for TextProcessingError {
    fn from(err: serde_yaml::Error) -> Self {
        TextProcessingError::KnowledgeBase(err.to_string())
    }
}

impl From<serde_json::Error> for TextProcessingError {
    fn from(err: serde_json::Error) -> Self {
        TextProcessingError::KnowledgeBase(err.to_string())
    }
}

impl From<TextProcessingError> for gramasathi_core::Error {
    fn from(err: TextProcessingError) -> Self {
        match err {
            TextProcessingError::Io(e) => gramasathi_core::Error::Io(e),
            other => gramasathi_core::Error::Config(other.to_string()),
        }
    }
}
