//! Message analysis
//!
//! `analyze` runs the rule checks, asks the model to classify when no rule
//! matched, always asks the model for the reply, forwards actionable intents
//! to the action server and records the exchange. Only invalid input is an
//! error; model and action server failures degrade to fallbacks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gramasathi_config::{AgentConfig, Settings};
use gramasathi_core::{
    ActionDispatcher, ActionRequest, AnalysisResult, DetectionSource, Intent, LanguageModel,
};
use gramasathi_llm::{parse_intent_label, LlmFactory, PromptBuilder, ResponseCache};
use gramasathi_text_processing::{
    ComplaintDetector, KnowledgeBase, ReferenceScanner, RuleBasedDetector, RuleConfidences,
};

use crate::chat_log::ChatLog;
use crate::AgentError;

pub struct GramaSathiAgent {
    rules: RuleBasedDetector,
    llm: Arc<dyn LanguageModel>,
    dispatcher: Arc<dyn ActionDispatcher>,
    prompts: PromptBuilder,
    classifications: ResponseCache,
    log: ChatLog,
    config: AgentConfig,
}

impl GramaSathiAgent {
    pub fn new(
        config: AgentConfig,
        knowledge: KnowledgeBase,
        llm: Arc<dyn LanguageModel>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        let rules = RuleBasedDetector::new(
            ComplaintDetector::new(&config.complaint_keywords, config.complaint_threshold),
            ReferenceScanner::new(&config.reference_prefixes),
            knowledge,
        )
        .with_confidences(RuleConfidences {
            water_complaint: config.confidence.water_complaint,
            complaint_status: config.confidence.complaint_status,
            local_information: config.confidence.local_information,
            unmatched: config.confidence.baseline,
        });

        Self {
            rules,
            llm,
            dispatcher,
            prompts: PromptBuilder::new(config.reply_language),
            classifications: ResponseCache::new(
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_seconds),
            ),
            log: ChatLog::disabled(),
            config,
        }
    }

    /// Build every dependency from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let llm = LlmFactory::create(&settings.llm)?;
        let dispatcher = gramasathi_tools::create_dispatcher(&settings.action_server)?;
        let knowledge = KnowledgeBase::load_or_empty(
            settings.knowledge_base.path.as_deref(),
            settings.knowledge_base.threshold,
        );
        let log = ChatLog::new(
            settings.logs.chat_log_path.clone(),
            settings.logs.complaint_log_path.clone(),
        );

        Ok(Self::new(settings.agent.clone(), knowledge, llm, dispatcher).with_chat_log(log))
    }

    pub fn with_chat_log(mut self, log: ChatLog) -> Self {
        self.log = log;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LanguageModel> {
        &self.llm
    }

    pub fn dispatcher(&self) -> &Arc<dyn ActionDispatcher> {
        &self.dispatcher
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        self.rules.knowledge_base()
    }

    pub fn cached_classifications(&self) -> usize {
        self.classifications.len()
    }

    /// Classify, reply, dispatch and log one citizen message
    pub async fn analyze(&self, message: &str) -> Result<AnalysisResult, AgentError> {
        let start = Instant::now();
        let text = message.trim();

        if text.is_empty() {
            return Err(AgentError::InvalidInput("message is empty".to_string()));
        }
        let length = text.chars().count();
        if length > self.config.max_message_chars {
            return Err(AgentError::InvalidInput(format!(
                "message is {} characters, limit is {}",
                length, self.config.max_message_chars
            )));
        }

        let mut detection = self.rules.detect(text);

        if detection.is_unmatched() {
            match self.classify(text).await {
                Some(intent) => {
                    detection.intent = intent;
                    detection.confidence = self.config.confidence.model_classified;
                    detection.source = DetectionSource::Model;
                }
                None => {
                    detection.intent = Intent::Other;
                    detection.confidence = self.config.confidence.baseline;
                }
            }
        }

        let reply = self
            .reply(text, detection.intent, detection.knowledge_answer.as_deref())
            .await;

        let m3_status = if detection.intent.requires_action() {
            let status = self
                .dispatcher
                .dispatch(ActionRequest {
                    intent: detection.intent,
                    entities: detection.entities.clone(),
                    message: text.to_string(),
                })
                .await;
            metrics::counter!("gramasathi_m3_dispatch_total", "status" => dispatch_outcome(&status))
                .increment(1);
            Some(status)
        } else {
            None
        };

        let result = AnalysisResult {
            intent_name: detection.intent,
            entities: detection.entities,
            confidence_score: detection.confidence,
            reply_to_user: reply,
            m3_status,
            knowledge_answer: detection.knowledge_answer,
            detection_source: detection.source,
        };

        if let Err(e) = self.log.record_async(text.to_string(), result.clone()).await {
            tracing::warn!(error = %e, "Failed to write chat log");
        }

        metrics::counter!(
            "gramasathi_intents_total",
            "intent" => result.intent_name.as_str(),
            "source" => result.detection_source.as_str()
        )
        .increment(1);
        metrics::histogram!("gramasathi_analyze_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            intent = %result.intent_name,
            confidence = result.confidence_score,
            source = result.detection_source.as_str(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Message analyzed"
        );

        Ok(result)
    }

    /// Model classification through the cache; `None` when the model failed
    async fn classify(&self, text: &str) -> Option<Intent> {
        if let Some(label) = self.classifications.get(text) {
            tracing::debug!(label = %label, "Classification cache hit");
            return Some(Intent::from_label(&label).unwrap_or(Intent::Other));
        }

        let start = Instant::now();
        let outcome = self
            .llm
            .generate(self.prompts.classification_request(text))
            .await;
        metrics::histogram!("gramasathi_model_duration_seconds", "call" => "classify")
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(response) => {
                let intent = parse_intent_label(&response.text);
                tracing::debug!(raw = %response.text.trim(), intent = %intent, "Model classification");
                self.classifications.insert(text, intent.as_str());
                Some(intent)
            }
            Err(e) => {
                tracing::warn!(error = %e, model = self.llm.model_name(), "Intent classification failed");
                None
            }
        }
    }

    /// Model reply, or the configured fallback
    async fn reply(&self, text: &str, intent: Intent, knowledge_answer: Option<&str>) -> String {
        let start = Instant::now();
        let outcome = self
            .llm
            .generate(self.prompts.reply_request(text, intent, knowledge_answer))
            .await;
        metrics::histogram!("gramasathi_model_duration_seconds", "call" => "reply")
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(response) if !response.text.trim().is_empty() => response.text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Model returned an empty reply, using fallback");
                self.config.fallback_reply.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, model = self.llm.model_name(), "Reply generation failed, using fallback");
                self.config.fallback_reply.clone()
            }
        }
    }
}

fn dispatch_outcome(status: &serde_json::Value) -> &'static str {
    match status.get("status").and_then(|s| s.as_str()) {
        Some(gramasathi_tools::STATUS_UNREACHABLE) => "unreachable",
        Some(gramasathi_tools::STATUS_DISABLED) => "disabled",
        _ => "delivered",
    }
}
