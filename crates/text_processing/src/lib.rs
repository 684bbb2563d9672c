//! Rule-based text analysis for the GramaSathi agent
//!
//! This crate provides the checks that run before any model call:
//! - **Fuzzy scoring**: `ratio` / `partial_ratio` on a 0..100 scale
//! - **Complaint detection**: fuzzy complaint keywords (Malayalam and transliterated)
//! - **Reference scanning**: complaint numbers such as `KWA12345`
//! - **Knowledge base**: keyword → answer lookup for local information
//! - **Intent detection**: the ordered rule pipeline combining the above

pub mod complaint;
pub mod fuzzy;
pub mod intent;
pub mod knowledge;
pub mod reference;

mod error;

pub use error::{Result, TextProcessingError};

pub use complaint::ComplaintDetector;
pub use intent::{RuleBasedDetector, RuleConfidences, RuleDetection, WATER_PROBLEM};
pub use knowledge::{KnowledgeBase, KnowledgeEntry, KnowledgeMatch};
pub use reference::ReferenceScanner;
