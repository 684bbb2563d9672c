//! Prompt construction and model output parsing

use once_cell::sync::Lazy;
use regex::Regex;

use gramasathi_core::{GenerateRequest, Intent, Language};

/// Builds the classification and reply prompts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    language: Language,
    /// Token budget for the one-word classification answer
    classification_max_tokens: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl PromptBuilder {
    pub fn new(language: Language) -> Self {
        Self {
            persona: "GramaSathi, a Kerala village AI".to_string(),
            language,
            classification_max_tokens: 16,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Ask the model for exactly one intent label
    pub fn classification_request(&self, message: &str) -> GenerateRequest {
        let labels = Intent::classifiable()
            .iter()
            .map(Intent::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "Classify the following message into one of these intents: {labels}.\n\
             Message: {message}\n\
             Respond with only the intent name."
        );

        GenerateRequest::from_prompt(prompt)
            .with_temperature(0.0)
            .with_max_tokens(self.classification_max_tokens)
    }

    /// Ask the model for the citizen-facing reply
    pub fn reply_request(
        &self,
        message: &str,
        intent: Intent,
        knowledge_answer: Option<&str>,
    ) -> GenerateRequest {
        let mut system = format!(
            "You are {persona}. Reply kindly and briefly in {language} to the villager's message. \
             Use simple words. Do not use markdown.",
            persona = self.persona,
            language = self.language.name(),
        );

        if intent != Intent::Unknown && intent != Intent::Other {
            system.push_str(&format!(
                "\nThe message was identified as: {}.",
                intent.as_str().replace('_', " ")
            ));
        }

        if let Some(answer) = knowledge_answer {
            system.push_str(&format!(
                "\nUse this verified local information in your reply: {answer}"
            ));
        }

        GenerateRequest::new(system).with_user_message(message)
    }
}

static LABEL_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]+").expect("valid regex"));

/// Map free-form model output to a classifiable intent
///
/// Unrecognized output becomes `Intent::Other`.
pub fn parse_intent_label(text: &str) -> Intent {
    let cleaned = text
        .trim()
        .to_lowercase()
        .replace(['"', '\'', '`', '*'], "");
    let cleaned = cleaned.trim_end_matches(['.', ',', '!', '?', ':', ';']).trim();
    let normalized = LABEL_SEPARATORS.replace_all(cleaned, "_");

    let labels = Intent::classifiable();

    if let Some(intent) = labels.iter().find(|i| i.as_str() == normalized) {
        return *intent;
    }

    labels
        .iter()
        .filter(|i| **i != Intent::Other)
        .find(|i| normalized.contains(i.as_str()))
        .copied()
        .unwrap_or(Intent::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramasathi_core::Role;

    #[test]
    fn test_classification_prompt_lists_labels() {
        let request = PromptBuilder::default().classification_request("pension venam");
        let prompt = &request.messages[0].content;
        assert!(prompt.contains(
            "health_info, pension_application, elderly_help, school_dropout_help, other"
        ));
        assert!(prompt.contains("Message: pension venam"));
        assert_eq!(request.temperature, Some(0.0));
    }

    #[test]
    fn test_reply_prompt_language_and_knowledge() {
        let request = PromptBuilder::new(Language::English).reply_request(
            "office timing?",
            Intent::LocalInformation,
            Some("Open 10am to 5pm"),
        );
        let system = request.system_prompt().unwrap();
        assert!(system.contains("GramaSathi"));
        assert!(system.contains("in English"));
        assert!(system.contains("Open 10am to 5pm"));
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "office timing?");
    }

    #[test]
    fn test_reply_prompt_defaults_to_malayalam() {
        let request = PromptBuilder::default().reply_request("hi", Intent::Other, None);
        assert!(request.system_prompt().unwrap().contains("Malayalam"));
    }

    #[test]
    fn test_parse_exact_labels() {
        assert_eq!(parse_intent_label("health_info"), Intent::HealthInfo);
        assert_eq!(parse_intent_label("  Pension_Application.\n"), Intent::PensionApplication);
        assert_eq!(parse_intent_label("`elderly_help`"), Intent::ElderlyHelp);
        assert_eq!(parse_intent_label("other"), Intent::Other);
    }

    #[test]
    fn test_parse_spaced_and_embedded_labels() {
        assert_eq!(parse_intent_label("school dropout help"), Intent::SchoolDropoutHelp);
        assert_eq!(parse_intent_label("Intent: health-info"), Intent::HealthInfo);
    }

    #[test]
    fn test_parse_unknown_is_other() {
        assert_eq!(parse_intent_label("water_complaint"), Intent::Other);
        assert_eq!(parse_intent_label("I am not sure"), Intent::Other);
        assert_eq!(parse_intent_label(""), Intent::Other);
    }
}
