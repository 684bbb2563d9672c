//! Analysis result returned by the agent

use serde::{Deserialize, Serialize};

use crate::intent::{Entities, Intent};

/// Which stage of the pipeline settled the intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Complaint keyword or complaint reference rule
    Rule,
    /// Fuzzy knowledge-base lookup
    KnowledgeBase,
    /// Language model classification
    Model,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::KnowledgeBase => "knowledge_base",
            Self::Model => "model",
        }
    }
}

/// Structured answer for one citizen message
///
/// Field names are the wire contract of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub intent_name: Intent,
    pub entities: Entities,
    pub confidence_score: f32,
    pub reply_to_user: String,
    /// Action server response, `null` when the intent needs no action
    pub m3_status: Option<serde_json::Value>,
    /// Knowledge-base answer the reply was grounded on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_answer: Option<String>,
    pub detection_source: DetectionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let mut entities = Entities::new();
        entities.insert("complaint_id".into(), "KWA123".into());

        let result = AnalysisResult {
            intent_name: Intent::ComplaintStatus,
            entities,
            confidence_score: 0.95,
            reply_to_user: "ശരി".into(),
            m3_status: None,
            knowledge_answer: None,
            detection_source: DetectionSource::Rule,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intent_name"], "complaint_status");
        assert_eq!(json["entities"]["complaint_id"], "KWA123");
        assert!(json["m3_status"].is_null());
        assert!(json.get("knowledge_answer").is_none());
        assert_eq!(json["detection_source"], "rule");
    }
}
