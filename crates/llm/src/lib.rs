//! Language model integration
//!
//! Features:
//! - Gemini (Generative Language REST API) and Ollama backends
//! - Retry with exponential backoff for transient failures
//! - Provider factory driven by `LlmSettings`
//! - Classification and reply prompts, intent label parsing
//! - Bounded TTL cache for classification results

pub mod backend;
pub mod cache;
pub mod factory;
pub mod gemini;
pub mod prompt;

pub use backend::{LlmConfig, OllamaBackend};
pub use cache::ResponseCache;
pub use factory::LlmFactory;
pub use gemini::GeminiBackend;
pub use prompt::{parse_intent_label, PromptBuilder};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Blocked by provider: {0}")]
    Blocked(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for gramasathi_core::Error {
    fn from(err: LlmError) -> Self {
        gramasathi_core::Error::Llm(err.to_string())
    }
}
