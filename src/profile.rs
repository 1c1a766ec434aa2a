//! Farm profile and language preference types.

use serde::{Deserialize, Serialize};

/// Supported user languages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Hindi.
    Hi,
    /// Punjabi.
    Pa,
    /// Marathi.
    Mr,
}

impl Language {
    /// ISO 639-1 code, as sent to the gateway.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Pa => "pa",
            Self::Mr => "mr",
        }
    }

    /// Display name embedded in the prompt language directive.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi (हिन्दी)",
            Self::Pa => "Punjabi (ਪੰਜਾਬੀ)",
            Self::Mr => "Marathi (मराठी)",
        }
    }

    /// Parse an ISO code, defaulting to English for unknown values.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "hi" => Self::Hi,
            "pa" => Self::Pa,
            "mr" => Self::Mr,
            _ => Self::En,
        }
    }
}

/// User farm profile, read-only input to advisory calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmProfile {
    /// Farm location (district or town), embedded in location-aware prompts.
    pub location: String,
    /// Preferred response language.
    pub language: Language,
    /// Primary crop, if known.
    pub crop: Option<String>,
    /// Soil type, if known.
    pub soil: Option<String>,
}

impl Default for FarmProfile {
    fn default() -> Self {
        Self {
            location: "Ludhiana".to_owned(),
            language: Language::En,
            crop: None,
            soil: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_defaults_to_english() {
        assert_eq!(Language::from_code("fr"), Language::En);
        assert_eq!(Language::from_code("hi"), Language::Hi);
    }

    #[test]
    fn codes_round_trip() {
        for lang in [Language::En, Language::Hi, Language::Pa, Language::Mr] {
            assert_eq!(Language::from_code(lang.code()), lang);
        }
    }
}
