//! Core traits and types for the GramaSathi agent
//!
//! This crate provides foundational types used across all other crates:
//! - Intent labels and extracted entities
//! - The analysis result returned to callers of the agent
//! - Provider-neutral LLM request/response types
//! - Reply language definitions
//! - Traits for the external services (language model, action server)
//! - Error types

pub mod analysis;
pub mod error;
pub mod intent;
pub mod language;
pub mod llm_types;
pub mod traits;

pub use analysis::{AnalysisResult, DetectionSource};
pub use error::{Error, Result};
pub use intent::{Entities, Intent};
pub use language::Language;
pub use llm_types::{FinishReason, GenerateRequest, GenerateResponse, Message, Role, TokenUsage};

pub use traits::{ActionDispatcher, ActionRequest, LanguageModel};
