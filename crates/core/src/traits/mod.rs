//! Traits for the external services the agent depends on
//!
//! ```text
//! LanguageModel:    intent classification and reply generation
//! ActionDispatcher: forwarding actionable intents to the action server (M3)
//! ```
//!
//! Both are object-safe so the agent can hold `Arc<dyn ...>` and tests can
//! swap in mocks.

mod action;
mod llm;

pub use action::{ActionDispatcher, ActionRequest};
pub use llm::LanguageModel;
