//! Gemini backend (Generative Language REST API)
//!
//! `POST {endpoint}/v1beta/models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header. The system message becomes
//! `systemInstruction`; user and assistant turns become `contents` with roles
//! `user` and `model`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use gramasathi_core::{
    FinishReason, GenerateRequest, GenerateResponse, LanguageModel, Role, TokenUsage,
};

use crate::backend::{check_status, with_retry, LlmConfig};
use crate::LlmError;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiBackend {
    client: Client,
    config: LlmConfig,
}

impl GeminiBackend {
    pub fn new(mut config: LlmConfig) -> Result<Self, LlmError> {
        if let Some(stripped) = config.model.strip_prefix("models/") {
            config.model = stripped.to_string();
        }
        let client = config.http_client()?;
        Ok(Self { client, config })
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.config.endpoint, self.config.model)
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("Gemini API key is not set".to_string()))
    }

    fn build_request(&self, request: &GenerateRequest) -> GeminiRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            let part = GeminiPart {
                text: message.content.clone(),
            };
            match message.role {
                Role::System => system_parts.push(part),
                Role::User => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
            }
        }

        GeminiRequest {
            contents,
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: None,
                    parts: system_parts,
                })
            },
            generation_config: GenerationConfig {
                temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
                max_output_tokens: Some(request.max_tokens.unwrap_or(self.config.max_tokens)),
                top_p: request.top_p.or(self.config.top_p),
            },
        }
    }

    async fn execute_request(
        &self,
        api_key: &str,
        body: &GeminiRequest,
    ) -> Result<GeminiResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

fn map_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        None | Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
        | Some("SPII") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Error,
    }
}

fn into_response(response: GeminiResponse) -> Result<GenerateResponse, LlmError> {
    let usage = response.usage_metadata.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(LlmError::Blocked(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(GenerateResponse {
        text,
        finish_reason: map_finish_reason(candidate.finish_reason.as_deref()),
        usage,
    })
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    async fn generate(&self, request: GenerateRequest) -> gramasathi_core::Result<GenerateResponse> {
        let api_key = self.api_key()?;
        let body = self.build_request(&request);

        let start = std::time::Instant::now();
        let response = with_retry(&self.config, || self.execute_request(api_key, &body)).await?;
        tracing::debug!(
            model = %self.config.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Gemini generation complete"
        );

        Ok(into_response(response)?)
    }

    async fn is_available(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };

        match self
            .client
            .get(self.model_url())
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Gemini availability check failed");
                false
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn config(endpoint: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            model: "gemini-2.5-flash-lite".to_string(),
            endpoint: endpoint.to_string(),
            api_key: api_key.map(String::from),
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
            ..LlmConfig::default()
        }
    }

    /// Mock API: fails with 503 for the first `failures` calls
    async fn spawn_mock(failures: u32) -> (String, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));

        async fn handler(
            State((calls, failures)): State<(Arc<AtomicU32>, u32)>,
            Path(action): Path<String>,
            headers: HeaderMap,
            Json(body): Json<serde_json::Value>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
                return (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"error": "bad key"})),
                );
            }
            if n < failures {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({"error": "overloaded"})),
                );
            }
            let prompt = body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": format!("{} -> ", action)}, {"text": prompt}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
                })),
            )
        }

        let app = Router::new()
            .route("/v1beta/models/:action", post(handler))
            .with_state((calls.clone(), failures));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), calls)
    }

    #[test]
    fn test_request_mapping() {
        let backend = GeminiBackend::new(config("http://unused", Some("k"))).unwrap();
        let request = GenerateRequest::new("You are GramaSathi")
            .with_user_message("hello")
            .with_assistant_message("namaskaram")
            .with_user_message("help")
            .with_max_tokens(64);

        let body = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are GramaSathi");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 64);
    }

    #[test]
    fn test_model_prefix_stripped() {
        let mut cfg = config("http://unused", None);
        cfg.model = "models/gemini-2.0-flash".to_string();
        let backend = GeminiBackend::new(cfg).unwrap();
        assert_eq!(backend.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(into_response(response), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(map_finish_reason(Some("MAX_TOKENS")), FinishReason::Length);
        assert_eq!(map_finish_reason(Some("SAFETY")), FinishReason::ContentFilter);
        assert_eq!(map_finish_reason(None), FinishReason::Stop);
        assert_eq!(map_finish_reason(Some("OTHER")), FinishReason::Error);
    }

    #[tokio::test]
    async fn test_generate_against_mock() {
        let (endpoint, calls) = spawn_mock(0).await;
        let backend = GeminiBackend::new(config(&endpoint, Some("test-key"))).unwrap();

        let response = backend
            .generate(GenerateRequest::from_prompt("ping"))
            .await
            .unwrap();

        assert_eq!(response.text, "gemini-2.5-flash-lite:generateContent -> ping");
        assert_eq!(response.usage.unwrap().total_tokens, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let (endpoint, calls) = spawn_mock(2).await;
        let backend = GeminiBackend::new(config(&endpoint, Some("test-key"))).unwrap();

        let response = backend.generate(GenerateRequest::from_prompt("x")).await;
        assert!(response.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let (endpoint, calls) = spawn_mock(0).await;
        let backend = GeminiBackend::new(config(&endpoint, Some("wrong-key"))).unwrap();

        let err = backend
            .generate(GenerateRequest::from_prompt("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let backend = GeminiBackend::new(config("http://127.0.0.1:9", None)).unwrap();
        assert!(backend.generate(GenerateRequest::from_prompt("x")).await.is_err());
        assert!(!backend.is_available().await);
    }
}
