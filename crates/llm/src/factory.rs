//! LLM Factory - Provider Abstraction Layer
//!
//! Creates the configured backend behind `Arc<dyn LanguageModel>`.
//!
//! ## Supported Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **Ollama**: Local models for offline development
//!
//! ## Example
//! ```ignore
//! let llm = LlmFactory::create(&settings.llm)?;
//! let reply = llm.generate(GenerateRequest::from_prompt("hello")).await?;
//! ```

use std::sync::Arc;

use gramasathi_config::{LlmProvider, LlmSettings};
use gramasathi_core::LanguageModel;

use crate::backend::{LlmConfig, OllamaBackend};
use crate::gemini::GeminiBackend;
use crate::LlmError;

pub struct LlmFactory;

impl LlmFactory {
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LanguageModel>, LlmError> {
        let config = LlmConfig::from_settings(settings);

        tracing::info!(
            provider = ?settings.provider,
            model = %config.model,
            endpoint = %config.endpoint,
            "Creating LLM backend"
        );

        let backend: Arc<dyn LanguageModel> = match settings.provider {
            LlmProvider::Gemini => {
                if config.api_key.is_none() {
                    tracing::warn!("Gemini API key missing; set GOOGLE_API_KEY or llm.api_key");
                }
                Arc::new(GeminiBackend::new(config)?)
            }
            LlmProvider::Ollama => Arc::new(OllamaBackend::new(config)?),
        };

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini() {
        let settings = LlmSettings {
            api_key: Some("key".to_string()),
            ..LlmSettings::default()
        };
        let llm = LlmFactory::create(&settings).unwrap();
        assert_eq!(llm.model_name(), "gemini-2.5-flash-lite");
    }

    #[test]
    fn test_create_ollama() {
        let settings = LlmSettings {
            provider: LlmProvider::Ollama,
            model: Some("llama3.2".to_string()),
            ..LlmSettings::default()
        };
        let llm = LlmFactory::create(&settings).unwrap();
        assert_eq!(llm.model_name(), "llama3.2");
    }
}
