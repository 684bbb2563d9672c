//! Append-only CSV logs of chats and complaints
//!
//! Each file gets its header row once, when it is created (or found empty).
//! Writes are synchronous; async callers go through [`ChatLog::record_async`],
//! which moves them onto tokio's blocking pool.

use chrono::Utc;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use gramasathi_core::AnalysisResult;

const CHAT_HEADERS: &[&str] = &["timestamp", "message", "intent", "confidence", "reply"];
const COMPLAINT_HEADERS: &[&str] = &["timestamp", "complaint_id", "intent", "problem", "message"];

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Log writer task failed: {0}")]
    Task(String),
}

struct CsvFile {
    path: PathBuf,
    headers: &'static [&'static str],
    lock: Mutex<()>,
}

impl CsvFile {
    fn new(path: PathBuf, headers: &'static [&'static str]) -> Self {
        Self {
            path,
            headers,
            lock: Mutex::new(()),
        }
    }

    fn append(&self, record: &[&str]) -> Result<(), LogError> {
        let _guard = self.lock.lock();

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(self.headers)?;
        }
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }
}

/// Chat and complaint CSV writers; either may be disabled
#[derive(Clone, Default)]
pub struct ChatLog {
    chat: Option<Arc<CsvFile>>,
    complaints: Option<Arc<CsvFile>>,
}

impl ChatLog {
    pub fn new(chat_path: Option<PathBuf>, complaint_path: Option<PathBuf>) -> Self {
        Self {
            chat: chat_path.map(|p| Arc::new(CsvFile::new(p, CHAT_HEADERS))),
            complaints: complaint_path.map(|p| Arc::new(CsvFile::new(p, COMPLAINT_HEADERS))),
        }
    }

    /// Logging switched off
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.chat.is_some() || self.complaints.is_some()
    }

    pub fn chat_path(&self) -> Option<&Path> {
        self.chat.as_ref().map(|f| f.path.as_path())
    }

    pub fn complaint_path(&self) -> Option<&Path> {
        self.complaints.as_ref().map(|f| f.path.as_path())
    }

    /// Record one analyzed message; complaints also go to the complaint log
    pub fn record(&self, message: &str, result: &AnalysisResult) -> Result<(), LogError> {
        let timestamp = Utc::now().to_rfc3339();

        if let Some(chat) = &self.chat {
            let confidence = format!("{:.2}", result.confidence_score);
            chat.append(&[
                timestamp.as_str(),
                message,
                result.intent_name.as_str(),
                confidence.as_str(),
                result.reply_to_user.as_str(),
            ])?;
        }

        if let Some(complaints) = &self.complaints {
            if result.intent_name.is_complaint() {
                complaints.append(&[
                    timestamp.as_str(),
                    entity(result, "complaint_id"),
                    result.intent_name.as_str(),
                    entity(result, "problem"),
                    message,
                ])?;
            }
        }

        Ok(())
    }
}

impl ChatLog {
    /// [`ChatLog::record`] on the blocking pool, so file I/O never stalls a runtime worker
    pub async fn record_async(
        &self,
        message: String,
        result: AnalysisResult,
    ) -> Result<(), LogError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let log = self.clone();
        tokio::task::spawn_blocking(move || log.record(&message, &result))
            .await
            .map_err(|e| LogError::Task(e.to_string()))?
    }
}

fn entity<'a>(result: &'a AnalysisResult, key: &str) -> &'a str {
    result.entities.get(key).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramasathi_core::{DetectionSource, Entities, Intent};

    fn result(intent: Intent, entities: Entities) -> AnalysisResult {
        AnalysisResult {
            intent_name: intent,
            entities,
            confidence_score: 0.9,
            reply_to_user: "ഞങ്ങൾ പരിശോധിക്കാം, നന്ദി".to_string(),
            m3_status: None,
            knowledge_answer: None,
            detection_source: DetectionSource::Rule,
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_headers_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let chat = dir.path().join("logs/chat_log.csv");
        let log = ChatLog::new(Some(chat.clone()), None);

        log.record("hello", &result(Intent::Other, Entities::new())).unwrap();
        log.record("again, with comma", &result(Intent::HealthInfo, Entities::new()))
            .unwrap();

        let rows = read_rows(&chat);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["timestamp", "message", "intent", "confidence", "reply"]);
        assert_eq!(rows[1][1], "hello");
        assert_eq!(rows[1][3], "0.90");
        assert_eq!(rows[2][1], "again, with comma");
        assert_eq!(rows[2][2], "health_info");
    }

    #[tokio::test]
    async fn test_record_async_writes_from_async_context() {
        let dir = tempfile::tempdir().unwrap();
        let chat = dir.path().join("chat_log.csv");
        let log = ChatLog::new(Some(chat.clone()), None);

        log.record_async(
            "vellam illa".to_string(),
            result(Intent::WaterComplaint, Entities::new()),
        )
        .await
        .unwrap();

        let rows = read_rows(&chat);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "vellam illa");
        assert_eq!(rows[1][2], "water_complaint");
    }

    #[tokio::test]
    async fn test_record_async_disabled_is_noop() {
        let log = ChatLog::disabled();
        assert!(!log.is_enabled());
        log.record_async("hello".to_string(), result(Intent::Other, Entities::new()))
            .await
            .unwrap();
    }

    #[test]
    fn test_complaints_only_for_complaint_intents() {
        let dir = tempfile::tempdir().unwrap();
        let complaints = dir.path().join("complaints.csv");
        let log = ChatLog::new(None, Some(complaints.clone()));

        let mut entities = Entities::new();
        entities.insert("problem".into(), "water issue".into());
        log.record("vellam illa", &result(Intent::WaterComplaint, entities))
            .unwrap();
        log.record("pension", &result(Intent::PensionApplication, Entities::new()))
            .unwrap();

        let rows = read_rows(&complaints);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "");
        assert_eq!(rows[1][2], "water_complaint");
        assert_eq!(rows[1][3], "water issue");
        assert_eq!(rows[1][4], "vellam illa");
    }

    #[test]
    fn test_disabled_log_is_noop() {
        let log = ChatLog::disabled();
        assert!(log.chat_path().is_none());
        assert!(log
            .record("hello", &result(Intent::Other, Entities::new()))
            .is_ok());
    }
}
