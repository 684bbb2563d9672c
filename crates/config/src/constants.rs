//! Centralized constants for the GramaSathi agent
//!
//! Single source of truth for the defaults the rule checks and external
//! clients fall back to when config leaves them unset.

/// Fuzzy-match thresholds (0-100 scale, compared with strict `>`)
pub mod thresholds {
    /// Complaint keyword vs. message
    pub const COMPLAINT_KEYWORD: f64 = 80.0;

    /// Knowledge-base keyword vs. message
    pub const KNOWLEDGE_BASE: f64 = 70.0;
}

/// Confidence assigned by each detection stage
pub mod confidence {
    pub const WATER_COMPLAINT: f32 = 0.9;
    pub const COMPLAINT_STATUS: f32 = 0.95;
    pub const LOCAL_INFORMATION: f32 = 0.85;
    pub const MODEL_CLASSIFIED: f32 = 0.75;
    /// Nothing matched (or the model could not be asked)
    pub const BASELINE: f32 = 0.5;
}

/// Complaint detection vocabulary
pub mod complaints {
    /// Malayalam script and transliterated words for complaint / water
    pub const KEYWORDS: &[&str] = &[
        "പരാതി",
        "വെള്ളം",
        "ജലം",
        "കുടിവെള്ളം",
        "vellam",
        "vellam illa",
        "jalam",
    ];

    /// Complaint references issued by the Kerala Water Authority
    pub const REFERENCE_PREFIXES: &[&str] = &["KWA"];
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// Generative Language API
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com";

    /// Ollama LLM endpoint
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// Action server (M3)
    pub const ACTION_SERVER_DEFAULT: &str = "http://127.0.0.1:6000/action";
}

/// Model defaults
pub mod models {
    pub const GEMINI_DEFAULT: &str = "gemini-2.5-flash-lite";
    pub const OLLAMA_DEFAULT: &str = "qwen3:4b-instruct-2507-q4_K_M";
}

/// Timeouts in seconds
pub mod timeouts {
    pub const LLM: u64 = 30;
    pub const ACTION_SERVER: u64 = 10;
    pub const MEDIA_FETCH: u64 = 30;
    /// Transcription runs a speech model on a notebook GPU; it is slow
    pub const TRANSCRIPTION: u64 = 300;
}
