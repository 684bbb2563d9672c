//! Local knowledge base with fuzzy keyword lookup
//!
//! Entries are `(keyword, answer)` pairs kept in file order. A lookup picks
//! the keyword with the best partial-ratio score against the message and
//! answers only when that score clears the threshold.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TextProcessingError};
use crate::fuzzy::{extract_one, partial_ratio};

/// One knowledge-base row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub keyword: String,
    pub answer: String,
}

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeMatch {
    pub keyword: String,
    pub answer: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    /// Lowercased keywords, parallel to `entries`
    keys: Vec<String>,
    threshold: f64,
}

impl KnowledgeBase {
    /// A repeated keyword keeps its first position and its last answer
    pub fn new(rows: Vec<KnowledgeEntry>, threshold: f64) -> Self {
        let mut entries: Vec<KnowledgeEntry> = Vec::with_capacity(rows.len());
        let mut keys: Vec<String> = Vec::with_capacity(rows.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in rows {
            let key = entry.keyword.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            match positions.get(&key) {
                Some(&idx) => {
                    tracing::debug!(keyword = %entry.keyword, "Duplicate knowledge base keyword, keeping the later answer");
                    entries[idx].answer = entry.answer;
                }
                None => {
                    positions.insert(key.clone(), entries.len());
                    keys.push(key);
                    entries.push(entry);
                }
            }
        }

        Self {
            entries,
            keys,
            threshold,
        }
    }

    /// Knowledge base that never matches
    pub fn empty(threshold: f64) -> Self {
        Self::new(Vec::new(), threshold)
    }

    /// Load from a `.csv`, `.yaml`/`.yml` or `.json` file
    ///
    /// CSV files need a `keyword,answer` header row. YAML and JSON files hold
    /// a list of `{keyword, answer}` objects.
    pub fn load(path: &Path, threshold: f64) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let entries = match extension.as_str() {
            "csv" => Self::read_csv(path)?,
            "yaml" | "yml" => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content)?
            }
            "json" => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            other => return Err(TextProcessingError::UnsupportedFormat(other.to_string())),
        };

        let kb = Self::new(entries, threshold);
        tracing::info!(path = %path.display(), entries = kb.len(), "Loaded knowledge base");
        Ok(kb)
    }

    /// Load when a path is configured, falling back to an empty knowledge base
    pub fn load_or_empty(path: Option<&Path>, threshold: f64) -> Self {
        let Some(path) = path else {
            return Self::empty(threshold);
        };

        if !path.exists() {
            tracing::warn!(path = %path.display(), "Knowledge base file not found, continuing without it");
            return Self::empty(threshold);
        }

        match Self::load(path, threshold) {
            Ok(kb) => kb,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load knowledge base");
                Self::empty(threshold)
            }
        }
    }

    fn read_csv(path: &Path) -> Result<Vec<KnowledgeEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut entries = Vec::new();
        for record in reader.deserialize() {
            let entry: KnowledgeEntry = record?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Best keyword match above the threshold, case-insensitive
    pub fn lookup(&self, text: &str) -> Option<KnowledgeMatch> {
        if self.keys.is_empty() {
            return None;
        }

        let lowered = text.to_lowercase();
        let (idx, score) = extract_one(&lowered, &self.keys, partial_ratio)?;
        if score <= self.threshold {
            return None;
        }

        let entry = &self.entries[idx];
        Some(KnowledgeMatch {
            keyword: entry.keyword.clone(),
            answer: entry.answer.clone(),
            score,
        })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![
                KnowledgeEntry {
                    keyword: "Panchayat office".into(),
                    answer: "Open 10am to 5pm".into(),
                },
                KnowledgeEntry {
                    keyword: "ration card".into(),
                    answer: "Apply at the taluk supply office".into(),
                },
            ],
            70.0,
        )
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let m = sample().lookup("when is the PANCHAYAT OFFICE open").unwrap();
        assert_eq!(m.keyword, "Panchayat office");
        assert_eq!(m.answer, "Open 10am to 5pm");
        assert_eq!(m.score, 100.0);
    }

    #[test]
    fn test_lookup_below_threshold() {
        assert!(sample().lookup("hello").is_none());
    }

    #[test]
    fn test_threshold_is_strict() {
        // "jalam" vs "jalxm" scores exactly 80
        let exact = partial_ratio("jalam", "jalxm");
        let entries = vec![KnowledgeEntry {
            keyword: "jalam".into(),
            answer: "KWA helpline 1916".into(),
        }];

        let at_score = KnowledgeBase::new(entries.clone(), exact);
        assert!(at_score.lookup("jalxm").is_none());

        let below = KnowledgeBase::new(entries, exact - 1.0);
        let m = below.lookup("jalxm").unwrap();
        assert_eq!(m.answer, "KWA helpline 1916");
        assert_eq!(m.score, exact);
    }

    #[test]
    fn test_duplicate_keyword_keeps_last_answer() {
        let kb = KnowledgeBase::new(
            vec![
                KnowledgeEntry {
                    keyword: "ration card".into(),
                    answer: "old answer".into(),
                },
                KnowledgeEntry {
                    keyword: "pension".into(),
                    answer: "akshaya centre".into(),
                },
                KnowledgeEntry {
                    keyword: "Ration Card ".into(),
                    answer: "civil supplies portal".into(),
                },
            ],
            70.0,
        );

        assert_eq!(kb.len(), 2);
        assert_eq!(kb.entries()[0].keyword, "ration card");
        assert_eq!(kb.entries()[0].answer, "civil supplies portal");
        assert_eq!(kb.lookup("new ration card").unwrap().answer, "civil supplies portal");
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(KnowledgeBase::empty(0.0).lookup("anything").is_none());
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "keyword,answer").unwrap();
        writeln!(file, "ration card,\"Visit the taluk office, bring Aadhaar\"").unwrap();
        writeln!(file, "ആശുപത്രി,PHC opens at 9am").unwrap();
        drop(file);

        let kb = KnowledgeBase::load(&path, 70.0).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.entries()[0].answer, "Visit the taluk office, bring Aadhaar");
        let m = kb.lookup("അടുത്ത ആശുപത്രി എവിടെ").unwrap();
        assert_eq!(m.answer, "PHC opens at 9am");
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.yaml");
        std::fs::write(
            &path,
            "- keyword: ration card\n  answer: taluk office\n- keyword: pension\n  answer: akshaya centre\n",
        )
        .unwrap();

        let kb = KnowledgeBase::load(&path, 70.0).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.lookup("my pension").unwrap().answer, "akshaya centre");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            KnowledgeBase::load(&path, 70.0),
            Err(TextProcessingError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let kb = KnowledgeBase::load_or_empty(Some(Path::new("/nonexistent/kb.csv")), 70.0);
        assert!(kb.is_empty());
        assert!(KnowledgeBase::load_or_empty(None, 70.0).is_empty());
    }
}
