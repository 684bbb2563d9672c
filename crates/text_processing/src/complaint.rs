//! Complaint keyword detection

use crate::fuzzy::partial_ratio;

/// Flags messages that fuzzily contain a complaint keyword
#[derive(Debug, Clone)]
pub struct ComplaintDetector {
    /// Lowercased keywords
    keywords: Vec<String>,
    /// Score a keyword must exceed (strict)
    threshold: f64,
}

impl ComplaintDetector {
    pub fn new<I, S>(keywords: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            threshold,
        }
    }

    /// Best scoring keyword for `text`, whether or not it passes the threshold
    pub fn best_match(&self, text: &str) -> Option<(&str, f64)> {
        let lowered = text.to_lowercase();
        let mut best: Option<(&str, f64)> = None;
        for keyword in &self.keywords {
            let score = partial_ratio(keyword, &lowered);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((keyword.as_str(), score));
            }
        }
        best
    }

    /// True when any keyword scores above the threshold
    pub fn is_complaint(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| partial_ratio(keyword, &lowered) > self.threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ComplaintDetector {
        ComplaintDetector::new(
            ["പരാതി", "വെള്ളം", "ജലം", "കുടിവെള്ളം", "vellam", "vellam illa", "jalam"],
            80.0,
        )
    }

    #[test]
    fn test_malayalam_keyword() {
        assert!(detector().is_complaint("ഞങ്ങളുടെ വീട്ടിൽ വെള്ളം ഇല്ല"));
        assert!(detector().is_complaint("എനിക്ക് ഒരു പരാതി ഉണ്ട്"));
    }

    #[test]
    fn test_transliterated_keyword_any_case() {
        assert!(detector().is_complaint("VELLAM ILLA since Monday"));
    }

    #[test]
    fn test_unrelated_text() {
        let detector = detector();
        assert!(!detector.is_complaint("When is the panchayat office open?"));
        assert!(!detector.is_complaint("Tell me a story"));
    }

    #[test]
    fn test_threshold_is_strict() {
        // "jalam" vs "jalxm" scores 80; a threshold at that value must not pass
        let exact = partial_ratio("jalam", "jalxm");
        assert!((exact - 80.0).abs() < 1e-9);
        let detector = ComplaintDetector::new(["jalam"], exact);
        assert!(!detector.is_complaint("jalxm"));

        let lower = ComplaintDetector::new(["jalam"], exact - 1.0);
        assert!(lower.is_complaint("jalxm"));
    }

    #[test]
    fn test_keyword_length_message_scores_both_ways() {
        // Same length as "jalam"; only the reversed window clears 80
        assert!(detector().is_complaint("jajla"));
    }

    #[test]
    fn test_best_match() {
        let detector = detector();
        let (keyword, score) = detector.best_match("vellam illa").unwrap();
        assert_eq!(keyword, "vellam");
        assert_eq!(score, 100.0);

        let empty = ComplaintDetector::new(Vec::<String>::new(), 80.0);
        assert!(empty.best_match("vellam").is_none());
        assert!(!empty.is_complaint("vellam"));
    }
}
