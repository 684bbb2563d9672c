//! Rule-based intent detection
//!
//! Three checks run in a fixed order over every message:
//!
//! 1. complaint keywords → `water_complaint`
//! 2. complaint reference → `complaint_status`
//! 3. knowledge base → `local_information`
//!
//! A later match overrides the intent and confidence of an earlier one, while
//! entities accumulate. When nothing matches the intent stays `unknown` and
//! the caller decides whether to ask a model.
//!
//! # Example
//!
//! ```
//! use gramasathi_core::Intent;
//! use gramasathi_text_processing::{
//!     ComplaintDetector, KnowledgeBase, ReferenceScanner, RuleBasedDetector,
//! };
//!
//! let detector = RuleBasedDetector::new(
//!     ComplaintDetector::new(["vellam"], 80.0),
//!     ReferenceScanner::new(["KWA"]),
//!     KnowledgeBase::empty(70.0),
//! );
//!
//! let result = detector.detect("status of KWA12345");
//! assert_eq!(result.intent, Intent::ComplaintStatus);
//! assert_eq!(result.entities["complaint_id"], "KWA12345");
//! ```

use gramasathi_core::{DetectionSource, Entities, Intent};
use std::sync::Arc;

use crate::complaint::ComplaintDetector;
use crate::knowledge::KnowledgeBase;
use crate::reference::ReferenceScanner;

/// Entity value recorded for keyword complaints
pub const WATER_PROBLEM: &str = "water issue";

/// Confidence assigned by each rule
#[derive(Debug, Clone, Copy)]
pub struct RuleConfidences {
    pub water_complaint: f32,
    pub complaint_status: f32,
    pub local_information: f32,
    pub unmatched: f32,
}

impl Default for RuleConfidences {
    fn default() -> Self {
        Self {
            water_complaint: 0.9,
            complaint_status: 0.95,
            local_information: 0.85,
            unmatched: 0.5,
        }
    }
}

/// Outcome of the rule checks
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDetection {
    pub intent: Intent,
    pub entities: Entities,
    pub confidence: f32,
    pub source: DetectionSource,
    /// Answer of the matched knowledge-base entry
    pub knowledge_answer: Option<String>,
}

impl RuleDetection {
    /// True when no rule matched
    pub fn is_unmatched(&self) -> bool {
        self.intent == Intent::Unknown
    }
}

pub struct RuleBasedDetector {
    complaints: ComplaintDetector,
    references: ReferenceScanner,
    knowledge: Arc<KnowledgeBase>,
    confidences: RuleConfidences,
}

impl RuleBasedDetector {
    pub fn new(
        complaints: ComplaintDetector,
        references: ReferenceScanner,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self {
            complaints,
            references,
            knowledge: Arc::new(knowledge),
            confidences: RuleConfidences::default(),
        }
    }

    pub fn with_confidences(mut self, confidences: RuleConfidences) -> Self {
        self.confidences = confidences;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Run every rule over `text`
    pub fn detect(&self, text: &str) -> RuleDetection {
        let mut detection = RuleDetection {
            intent: Intent::Unknown,
            entities: Entities::new(),
            confidence: self.confidences.unmatched,
            source: DetectionSource::Rule,
            knowledge_answer: None,
        };

        let complaint = self
            .complaints
            .best_match(text)
            .filter(|(_, score)| *score > self.complaints.threshold());
        if let Some((keyword, score)) = complaint {
            tracing::debug!(keyword, score, "Complaint keyword matched");
            detection.intent = Intent::WaterComplaint;
            detection
                .entities
                .insert("problem".to_string(), WATER_PROBLEM.to_string());
            detection.confidence = self.confidences.water_complaint;
        }

        if let Some(complaint_id) = self.references.check_status(text) {
            detection.intent = Intent::ComplaintStatus;
            detection
                .entities
                .insert("complaint_id".to_string(), complaint_id);
            detection.confidence = self.confidences.complaint_status;
        }

        if let Some(found) = self.knowledge.lookup(text) {
            tracing::debug!(keyword = %found.keyword, score = found.score, "Knowledge base match");
            detection.intent = Intent::LocalInformation;
            detection.confidence = self.confidences.local_information;
            detection.source = DetectionSource::KnowledgeBase;
            detection.knowledge_answer = Some(found.answer);
        }

        detection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeEntry;

    fn detector() -> RuleBasedDetector {
        RuleBasedDetector::new(
            ComplaintDetector::new(
                ["പരാതി", "വെള്ളം", "ജലം", "കുടിവെള്ളം", "vellam", "vellam illa", "jalam"],
                80.0,
            ),
            ReferenceScanner::new(["KWA"]),
            KnowledgeBase::new(
                vec![KnowledgeEntry {
                    keyword: "panchayat office".into(),
                    answer: "Open 10am to 5pm".into(),
                }],
                70.0,
            ),
        )
    }

    #[test]
    fn test_water_complaint() {
        let result = detector().detect("vellam illa");
        assert_eq!(result.intent, Intent::WaterComplaint);
        assert_eq!(result.entities["problem"], "water issue");
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.source, DetectionSource::Rule);
    }

    #[test]
    fn test_reference_overrides_complaint_keeps_entities() {
        let result = detector().detect("vellam illa, complaint KWA12345");
        assert_eq!(result.intent, Intent::ComplaintStatus);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.entities["problem"], "water issue");
        assert_eq!(result.entities["complaint_id"], "KWA12345");
    }

    #[test]
    fn test_knowledge_base_overrides_all() {
        let result = detector().detect("KWA99 panchayat office");
        assert_eq!(result.intent, Intent::LocalInformation);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.source, DetectionSource::KnowledgeBase);
        assert_eq!(result.knowledge_answer.as_deref(), Some("Open 10am to 5pm"));
        assert_eq!(result.entities["complaint_id"], "KWA99");
    }

    #[test]
    fn test_unmatched() {
        let result = detector().detect("Tell me a story");
        assert!(result.is_unmatched());
        assert_eq!(result.confidence, 0.5);
        assert!(result.entities.is_empty());
        assert!(result.knowledge_answer.is_none());
    }

    #[test]
    fn test_custom_confidences() {
        let detector = detector().with_confidences(RuleConfidences {
            water_complaint: 0.6,
            ..RuleConfidences::default()
        });
        assert_eq!(detector.detect("vellam").confidence, 0.6);
    }
}
