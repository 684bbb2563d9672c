//! Language Model trait

use async_trait::async_trait;

use crate::{GenerateRequest, GenerateResponse, Result};

/// Language Model interface
///
/// Implementations:
/// - `GeminiBackend` - Google Generative Language API
/// - `OllamaBackend` - Local Ollama inference
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = LlmFactory::create(&settings.llm)?;
/// let response = llm.generate(GenerateRequest::from_prompt("Hello")).await?;
/// println!("{}", response.text);
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate completion
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Check if model is available
    ///
    /// Returns false if the model is unknown or the backend is unreachable.
    async fn is_available(&self) -> bool;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLlm;

    #[async_trait]
    impl LanguageModel for MockLlm {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(GenerateResponse::text(format!("echo: {}", last)))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock-llm"
        }
    }

    #[tokio::test]
    async fn test_mock_llm_through_trait_object() {
        let llm: Box<dyn LanguageModel> = Box::new(MockLlm);
        assert!(llm.is_available().await);
        assert_eq!(llm.model_name(), "mock-llm");

        let response = llm
            .generate(GenerateRequest::from_prompt("vellam illa"))
            .await
            .unwrap();
        assert_eq!(response.text, "echo: vellam illa");
    }
}
