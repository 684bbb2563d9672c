//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{endpoints, models, thresholds, timeouts};
use crate::{AgentConfig, ConfigError};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative model
    #[serde(default)]
    pub llm: LlmSettings,

    /// Intent detection and reply behavior
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Downstream action server (M3)
    #[serde(default)]
    pub action_server: ActionServerConfig,

    /// Voice-message relay
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Chat / complaint CSV logs
    #[serde(default)]
    pub logs: LogFilesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_agent()?;
        self.validate_knowledge_base()?;
        self.validate_action_server()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.auth.enabled && server.auth.api_key.as_deref().unwrap_or("").is_empty() {
            if self.environment.is_production() {
                return Err(ConfigError::InvalidValue {
                    field: "server.auth.api_key".to_string(),
                    message: "Authentication is enabled but no API key is configured".to_string(),
                });
            }
            tracing::warn!("Authentication enabled without an API key; all protected requests will be rejected");
        }

        if self.environment.is_production() && !server.auth.enabled {
            tracing::warn!("Authentication is disabled in production");
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if llm.provider == LlmProvider::Gemini && llm.api_key.as_deref().unwrap_or("").is_empty()
        {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField(
                    "llm.api_key (or GOOGLE_API_KEY)".to_string(),
                ));
            }
            tracing::warn!("Gemini selected without an API key; model calls will fail");
        }

        Ok(())
    }

    fn validate_agent(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;

        validate_threshold("agent.complaint_threshold", agent.complaint_threshold)?;

        for (name, value) in agent.confidence.entries() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: format!("agent.confidence.{}", name),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if agent.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.cache_capacity".to_string(),
                message: "Cache capacity must be at least 1".to_string(),
            });
        }

        if agent.max_message_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_message_chars".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if agent.complaint_keywords.is_empty() {
            tracing::warn!("No complaint keywords configured; keyword detection is disabled");
        }

        Ok(())
    }

    fn validate_knowledge_base(&self) -> Result<(), ConfigError> {
        validate_threshold("knowledge_base.threshold", self.knowledge_base.threshold)
    }

    fn validate_action_server(&self) -> Result<(), ConfigError> {
        let action = &self.action_server;
        if action.enabled && action.url.trim().is_empty() {
            return Err(ConfigError::MissingField("action_server.url".to_string()));
        }
        if action.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "action_server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_threshold(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be between 0 and 100, got {}", value),
        });
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds (the webhook waits on transcription, keep it generous)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = localhost only)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    timeouts::TRANSCRIPTION + 30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Enable authentication (set to false for development)
    #[serde(default)]
    pub enabled: bool,

    /// API key (set via GRAMASATHI__SERVER__AUTH__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Paths that bypass authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
        "/webhook".to_string(),
    ]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

/// Generative model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name; provider default when unset
    #[serde(default)]
    pub model: Option<String>,

    /// API base URL; provider default when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key (falls back to GOOGLE_API_KEY)
    #[serde(default = "default_google_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub top_p: Option<f32>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_google_api_key() -> Option<String> {
    std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty())
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

fn default_llm_timeout() -> u64 {
    timeouts::LLM
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            endpoint: None,
            api_key: default_google_api_key(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: None,
            timeout_seconds: default_llm_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

impl LlmSettings {
    /// Configured model, or the provider's default
    pub fn resolved_model(&self) -> String {
        match &self.model {
            Some(model) if !model.is_empty() => model.clone(),
            _ => match self.provider {
                LlmProvider::Gemini => models::GEMINI_DEFAULT.to_string(),
                LlmProvider::Ollama => models::OLLAMA_DEFAULT.to_string(),
            },
        }
    }

    /// Configured endpoint, or the provider's default
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.clone(),
            _ => match self.provider {
                LlmProvider::Gemini => endpoints::GEMINI_DEFAULT.to_string(),
                LlmProvider::Ollama => std::env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| endpoints::OLLAMA_DEFAULT.to_string()),
            },
        }
    }
}

/// Knowledge base location and match threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// CSV (`keyword,answer`), YAML or JSON file
    #[serde(default = "default_kb_path")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_kb_threshold")]
    pub threshold: f64,
}

fn default_kb_path() -> Option<PathBuf> {
    Some(PathBuf::from("data/knowledge_base.csv"))
}

fn default_kb_threshold() -> f64 {
    thresholds::KNOWLEDGE_BASE
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
            threshold: default_kb_threshold(),
        }
    }
}

/// Action server (M3) client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_action_url")]
    pub url: String,

    #[serde(default = "default_action_timeout")]
    pub timeout_seconds: u64,
}

fn default_action_url() -> String {
    endpoints::ACTION_SERVER_DEFAULT.to_string()
}

fn default_action_timeout() -> u64 {
    timeouts::ACTION_SERVER
}

impl Default for ActionServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_action_url(),
            timeout_seconds: default_action_timeout(),
        }
    }
}

/// Telephony relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// Provider account SID (falls back to TWILIO_ACCOUNT_SID)
    #[serde(default = "default_account_sid")]
    pub account_sid: Option<String>,

    /// Provider auth token (falls back to TWILIO_AUTH_TOKEN)
    #[serde(default = "default_auth_token")]
    pub auth_token: Option<String>,

    /// Transcription service endpoint
    #[serde(default = "default_transcribe_url")]
    pub transcribe_url: String,

    #[serde(default = "default_media_timeout")]
    pub media_timeout_seconds: u64,

    #[serde(default = "default_transcribe_timeout")]
    pub transcribe_timeout_seconds: u64,

    /// Route plain text messages (no media) through the agent
    #[serde(default)]
    pub analyze_text_messages: bool,
}

fn default_account_sid() -> Option<String> {
    std::env::var("TWILIO_ACCOUNT_SID").ok().filter(|v| !v.is_empty())
}

fn default_auth_token() -> Option<String> {
    std::env::var("TWILIO_AUTH_TOKEN").ok().filter(|v| !v.is_empty())
}

fn default_transcribe_url() -> String {
    "http://127.0.0.1:8000/transcribe".to_string()
}

fn default_media_timeout() -> u64 {
    timeouts::MEDIA_FETCH
}

fn default_transcribe_timeout() -> u64 {
    timeouts::TRANSCRIPTION
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: default_account_sid(),
            auth_token: default_auth_token(),
            transcribe_url: default_transcribe_url(),
            media_timeout_seconds: default_media_timeout(),
            transcribe_timeout_seconds: default_transcribe_timeout(),
            analyze_text_messages: false,
        }
    }
}

/// CSV log destinations; logging is off for a path left unset
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogFilesConfig {
    #[serde(default)]
    pub chat_log_path: Option<PathBuf>,

    #[serde(default)]
    pub complaint_log_path: Option<PathBuf>,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// OTLP endpoint for traces (used with the `telemetry` feature)
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            otlp_endpoint: None,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` plus environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a config directory
///
/// Sources, lowest priority first: `{dir}/default`, `{dir}/{env}`, then
/// `GRAMASATHI__*` environment variables.
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("GRAMASATHI")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
