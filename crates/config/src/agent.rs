//! Agent behavior configuration

use gramasathi_core::Language;
use serde::{Deserialize, Serialize};

use crate::constants::{complaints, confidence, thresholds};

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Language the model replies in
    #[serde(default)]
    pub reply_language: Language,

    /// Keywords that mark a message as a water complaint
    #[serde(default = "default_complaint_keywords")]
    pub complaint_keywords: Vec<String>,

    /// Fuzzy score a complaint keyword must exceed
    #[serde(default = "default_complaint_threshold")]
    pub complaint_threshold: f64,

    /// Prefixes identifying complaint reference numbers
    #[serde(default = "default_reference_prefixes")]
    pub reference_prefixes: Vec<String>,

    /// Confidence per detection stage
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Reply used when the model cannot produce one
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// Longest accepted message, in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Classification cache capacity
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Classification cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

fn default_complaint_keywords() -> Vec<String> {
    complaints::KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_complaint_threshold() -> f64 {
    thresholds::COMPLAINT_KEYWORD
}

fn default_reference_prefixes() -> Vec<String> {
    complaints::REFERENCE_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_fallback_reply() -> String {
    "ക്ഷമിക്കണം, ഇപ്പോൾ മറുപടി നൽകാൻ കഴിയുന്നില്ല. ദയവായി കുറച്ച് കഴിഞ്ഞ് വീണ്ടും ശ്രമിക്കുക."
        .to_string()
}

fn default_max_message_chars() -> usize {
    2000
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            reply_language: Language::default(),
            complaint_keywords: default_complaint_keywords(),
            complaint_threshold: default_complaint_threshold(),
            reference_prefixes: default_reference_prefixes(),
            confidence: ConfidenceConfig::default(),
            fallback_reply: default_fallback_reply(),
            max_message_chars: default_max_message_chars(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Confidence assigned by each detection stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    #[serde(default = "default_water_complaint")]
    pub water_complaint: f32,

    #[serde(default = "default_complaint_status")]
    pub complaint_status: f32,

    #[serde(default = "default_local_information")]
    pub local_information: f32,

    #[serde(default = "default_model_classified")]
    pub model_classified: f32,

    /// Unmatched messages and failed classifications
    #[serde(default = "default_baseline")]
    pub baseline: f32,
}

fn default_water_complaint() -> f32 {
    confidence::WATER_COMPLAINT
}
fn default_complaint_status() -> f32 {
    confidence::COMPLAINT_STATUS
}
fn default_local_information() -> f32 {
    confidence::LOCAL_INFORMATION
}
fn default_model_classified() -> f32 {
    confidence::MODEL_CLASSIFIED
}
fn default_baseline() -> f32 {
    confidence::BASELINE
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            water_complaint: default_water_complaint(),
            complaint_status: default_complaint_status(),
            local_information: default_local_information(),
            model_classified: default_model_classified(),
            baseline: default_baseline(),
        }
    }
}

impl ConfidenceConfig {
    /// All values with their field names, for validation
    pub fn entries(&self) -> [(&'static str, f32); 5] {
        [
            ("water_complaint", self.water_complaint),
            ("complaint_status", self.complaint_status),
            ("local_information", self.local_information),
            ("model_classified", self.model_classified),
            ("baseline", self.baseline),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.reply_language, Language::Malayalam);
        assert_eq!(config.complaint_threshold, 80.0);
        assert_eq!(config.reference_prefixes, vec!["KWA".to_string()]);
        assert!(config.complaint_keywords.iter().any(|k| k == "vellam illa"));
        assert_eq!(config.confidence.complaint_status, 0.95);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AgentConfig =
            serde_yaml::from_str("reply_language: english\ncache_capacity: 10\n").unwrap();
        assert_eq!(config.reply_language, Language::English);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.max_message_chars, 2000);
        assert_eq!(config.confidence.baseline, 0.5);
    }
}
