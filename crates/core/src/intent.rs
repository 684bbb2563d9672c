//! Intent labels
//!
//! The agent resolves every citizen message to one of these labels. The first
//! three come from the rule checks; the remaining ones are what the language
//! model is allowed to answer with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Entities extracted alongside an intent (e.g. `complaint_id`)
pub type Entities = BTreeMap<String, String>;

/// Citizen intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Drinking-water complaint, detected by keyword
    WaterComplaint,
    /// Status query for an existing complaint reference
    ComplaintStatus,
    /// Answered from the local knowledge base
    LocalInformation,
    HealthInfo,
    PensionApplication,
    ElderlyHelp,
    SchoolDropoutHelp,
    Other,
    /// No rule matched and the model has not been asked yet
    #[default]
    Unknown,
}

impl Intent {
    /// Snake-case label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaterComplaint => "water_complaint",
            Self::ComplaintStatus => "complaint_status",
            Self::LocalInformation => "local_information",
            Self::HealthInfo => "health_info",
            Self::PensionApplication => "pension_application",
            Self::ElderlyHelp => "elderly_help",
            Self::SchoolDropoutHelp => "school_dropout_help",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    /// Parse an exact snake-case label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|i| i.as_str() == label)
    }

    /// Whether this intent is forwarded to the action server
    pub fn requires_action(&self) -> bool {
        !matches!(self, Self::LocalInformation | Self::Other)
    }

    /// Whether this intent is a complaint that gets recorded in the complaint log
    pub fn is_complaint(&self) -> bool {
        matches!(self, Self::WaterComplaint | Self::ComplaintStatus)
    }

    /// Labels the language model may choose from
    pub fn classifiable() -> &'static [Intent] {
        &[
            Self::HealthInfo,
            Self::PensionApplication,
            Self::ElderlyHelp,
            Self::SchoolDropoutHelp,
            Self::Other,
        ]
    }

    /// All labels
    pub fn all() -> &'static [Intent] {
        &[
            Self::WaterComplaint,
            Self::ComplaintStatus,
            Self::LocalInformation,
            Self::HealthInfo,
            Self::PensionApplication,
            Self::ElderlyHelp,
            Self::SchoolDropoutHelp,
            Self::Other,
            Self::Unknown,
        ]
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_matches_serde() {
        for intent in Intent::all() {
            let json = serde_json::to_string(intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
            assert_eq!(Intent::from_label(intent.as_str()), Some(*intent));
        }
    }

    #[test]
    fn test_requires_action() {
        assert!(!Intent::LocalInformation.requires_action());
        assert!(!Intent::Other.requires_action());
        assert!(Intent::WaterComplaint.requires_action());
        assert!(Intent::ComplaintStatus.requires_action());
        assert!(Intent::PensionApplication.requires_action());
    }

    #[test]
    fn test_classifiable_excludes_rule_intents() {
        let labels = Intent::classifiable();
        assert!(!labels.contains(&Intent::WaterComplaint));
        assert!(!labels.contains(&Intent::Unknown));
        assert!(labels.contains(&Intent::Other));
    }
}
