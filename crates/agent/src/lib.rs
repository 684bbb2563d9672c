//! GramaSathi agent
//!
//! Features:
//! - Ordered rule checks (complaint keywords, complaint references, knowledge base)
//! - Model classification fallback with a bounded TTL cache
//! - Localized reply generation with a configured fallback
//! - Action server forwarding for actionable intents
//! - Append-only CSV chat and complaint logs

pub mod agent;
pub mod chat_log;

pub use agent::GramaSathiAgent;
pub use chat_log::{ChatLog, LogError};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl From<gramasathi_llm::LlmError> for AgentError {
    fn from(err: gramasathi_llm::LlmError) -> Self {
        AgentError::Initialization(err.to_string())
    }
}

impl From<gramasathi_tools::ActionError> for AgentError {
    fn from(err: gramasathi_tools::ActionError) -> Self {
        AgentError::Initialization(err.to_string())
    }
}

impl From<AgentError> for gramasathi_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InvalidInput(msg) => gramasathi_core::Error::InvalidInput(msg),
            AgentError::Initialization(msg) => gramasathi_core::Error::Config(msg),
        }
    }
}
