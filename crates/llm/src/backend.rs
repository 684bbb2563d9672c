//! Shared backend plumbing and the Ollama backend
//!
//! Every backend retries transient failures (network errors, timeouts and
//! 5xx responses) with exponential backoff. 4xx responses fail immediately.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use gramasathi_config::LlmSettings;
use gramasathi_core::{
    FinishReason, GenerateRequest, GenerateResponse, LanguageModel, Role, TokenUsage,
};

use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// API key (optional)
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature
    pub temperature: f32,
    /// Top-p sampling
    pub top_p: Option<f32>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from_settings(&LlmSettings::default())
    }
}

impl LlmConfig {
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            model: settings.resolved_model(),
            endpoint: settings.resolved_endpoint().trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            timeout: Duration::from_secs(settings.timeout_seconds),
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
        }
    }

    pub(crate) fn http_client(&self) -> Result<Client, LlmError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))
    }
}

/// Check if an error is worth another attempt
pub(crate) fn is_retryable(error: &LlmError) -> bool {
    matches!(error, LlmError::Network(_) | LlmError::Timeout)
}

/// Run `op` with exponential backoff on retryable errors
pub(crate) async fn with_retry<T, F, Fut>(config: &LlmConfig, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_error = None;
    let mut backoff = config.initial_backoff;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            tracing::warn!(
                "LLM request failed, retrying in {:?} (attempt {}/{})",
                backoff,
                attempt,
                config.max_retries
            );
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
}

/// Turn a non-success HTTP status into an error (5xx retryable, 4xx not)
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
    }
    Err(LlmError::Api(format!("HTTP {}: {}", status, error)))
}

/// Ollama backend for local development
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = config.http_client()?;
        Ok(Self { client, config })
    }

    /// Build the API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint, path)
    }

    fn build_request(&self, request: &GenerateRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: role_name(m.role).to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
                top_p: request.top_p.or(self.config.top_p),
                num_predict: Some(request.max_tokens.unwrap_or(self.config.max_tokens) as i32),
            }),
            keep_alive: Some("5m".to_string()),
            // Disable extended thinking for models like qwen3
            think: Some(false),
        }
    }

    async fn execute_request(
        &self,
        request: &OllamaChatRequest,
    ) -> Result<OllamaChatResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/chat"))
            .json(request)
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl LanguageModel for OllamaBackend {
    async fn generate(&self, request: GenerateRequest) -> gramasathi_core::Result<GenerateResponse> {
        let body = self.build_request(&request);
        let result = with_retry(&self.config, || self.execute_request(&body)).await?;

        let prompt_tokens = result.prompt_eval_count.unwrap_or(0) as u32;
        let completion_tokens = result.eval_count.unwrap_or(0) as u32;

        Ok(GenerateResponse {
            text: result.message.content,
            finish_reason: if result.done {
                FinishReason::Stop
            } else {
                FinishReason::Length
            },
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    async fn is_available(&self) -> bool {
        match self.client.get(self.api_url("/tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    /// Keep model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
}
