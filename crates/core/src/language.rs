//! Reply languages
//!
//! GramaSathi serves Kerala first, so Malayalam is the default. The other
//! South Indian languages plus Hindi and English are accepted for deployments
//! in neighbouring districts.

use serde::{Deserialize, Serialize};

/// Supported reply languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Malayalam,
    English,
    Hindi,
    Tamil,
    Kannada,
    Telugu,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malayalam => "ml",
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Tamil => "ta",
            Self::Kannada => "kn",
            Self::Telugu => "te",
        }
    }

    /// Human-readable name, used verbatim in prompts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Malayalam => "Malayalam",
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Kannada => "Kannada",
            Self::Telugu => "Telugu",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_malayalam() {
        assert_eq!(Language::default(), Language::Malayalam);
        assert_eq!(Language::default().code(), "ml");
    }
}
