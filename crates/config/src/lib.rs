//! Configuration management for the GramaSathi agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`GRAMASATHI__` prefix, `__` separator)
//! - Conventional secret variables (`GOOGLE_API_KEY`, `TWILIO_ACCOUNT_SID`,
//!   `TWILIO_AUTH_TOKEN`) as defaults

pub mod agent;
pub mod constants;
pub mod settings;

pub use agent::{AgentConfig, ConfidenceConfig};
pub use settings::{
    load_settings, load_settings_from, ActionServerConfig, AuthConfig, KnowledgeBaseConfig,
    LlmProvider, LlmSettings, LogFilesConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, TelephonyConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for gramasathi_core::Error {
    fn from(err: ConfigError) -> Self {
        gramasathi_core::Error::Config(err.to_string())
    }
}
