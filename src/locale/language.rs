use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five supported application languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Gujarati,
    Telugu,
    Kannada,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Gujarati,
        Language::Telugu,
        Language::Kannada,
    ];

    /// Resolve an application identifier (`"hindi"`), falling back to English
    pub fn resolve(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "hindi" => Language::Hindi,
            "gujarati" => Language::Gujarati,
            "telugu" => Language::Telugu,
            "kannada" => Language::Kannada,
            _ => Language::English,
        }
    }

    /// Application identifier, as used by the UI and config files
    pub fn identifier(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Gujarati => "gujarati",
            Language::Telugu => "telugu",
            Language::Kannada => "kannada",
        }
    }

    /// BCP-47 tag for live recognition and speech synthesis
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Gujarati => "gu-IN",
            Language::Telugu => "te-IN",
            Language::Kannada => "kn-IN",
        }
    }

    /// ISO 639-1 hint for cloud transcription
    pub fn transcription_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Gujarati => "gu",
            Language::Telugu => "te",
            Language::Kannada => "kn",
        }
    }

    /// Instruction appended to the assistant prompt
    pub fn response_instruction(&self) -> &'static str {
        match self {
            Language::English => "Respond in English.",
            Language::Hindi => "Respond in Hindi (हिंदी).",
            Language::Gujarati => "Respond in Gujarati (ગુજરાતી).",
            Language::Telugu => "Respond in Telugu (తెలుగు).",
            Language::Kannada => "Respond in Kannada (ಕನ್ನಡ).",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl From<&str> for Language {
    fn from(identifier: &str) -> Self {
        Language::resolve(identifier)
    }
}
