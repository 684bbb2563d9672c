//! Complaint reference number scanning

const TRIM_CHARS: &[char] = &['.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '"', '\''];

/// Finds complaint reference tokens such as `KWA12345`
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    /// Uppercased prefixes
    prefixes: Vec<String>,
}

impl ReferenceScanner {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// First whitespace token starting with a known prefix, uppercased
    ///
    /// Surrounding punctuation is dropped, so "(kwa123)." yields `KWA123`.
    pub fn check_status(&self, text: &str) -> Option<String> {
        text.split_whitespace()
            .map(|token| token.trim_matches(TRIM_CHARS).to_uppercase())
            .find(|token| {
                !token.is_empty() && self.prefixes.iter().any(|p| token.starts_with(p.as_str()))
            })
    }
}
