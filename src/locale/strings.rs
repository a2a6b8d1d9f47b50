use super::{Language, Scheme};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// UI string table for one language
///
/// Missing keys in a language file fall back to the English defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiStrings {
    pub welcome: String,
    pub select_language: String,
    pub search: String,
    pub select_option: String,
    pub others: String,
    pub how_to_fill: String,
    pub online: String,
    pub offline: String,
    pub things_you_need: String,
    pub scheme_provides: String,
    pub ai_bot: String,
    #[serde(rename = "chatWithAI")]
    pub chat_with_ai: String,
    pub enter_message: String,
    pub send: String,
    pub loading: String,
    pub listening: String,
    pub speaking: String,
    pub voice_input: String,
    pub text_to_speech: String,
    pub tap_to_speak: String,
    pub tap_to_stop: String,

    /// Scheme key → localized scheme name
    pub options: BTreeMap<String, String>,
}

impl Default for UiStrings {
    fn default() -> Self {
        let options = Scheme::ALL
            .into_iter()
            .filter(|s| *s != Scheme::Others)
            .map(|s| (s.key().to_string(), s.full_name().to_string()))
            .collect();

        Self {
            welcome: "Welcome to FormFriend".to_string(),
            select_language: "Select Your Language".to_string(),
            search: "Search".to_string(),
            select_option: "Select a Government Scheme".to_string(),
            others: "Others".to_string(),
            how_to_fill: "How do you want to apply for this scheme?".to_string(),
            online: "Online".to_string(),
            offline: "Offline".to_string(),
            things_you_need: "Things You Need".to_string(),
            scheme_provides: "What Does the Scheme Provide".to_string(),
            ai_bot: "AI Assistant".to_string(),
            chat_with_ai: "Chat with AI".to_string(),
            enter_message: "Type or speak your message...".to_string(),
            send: "Send".to_string(),
            loading: "Loading...".to_string(),
            listening: "Listening...".to_string(),
            speaking: "Speaking...".to_string(),
            voice_input: "Voice Input".to_string(),
            text_to_speech: "Text to Speech".to_string(),
            tap_to_speak: "Tap to speak".to_string(),
            tap_to_stop: "Tap to stop".to_string(),
            options,
        }
    }
}

impl UiStrings {
    /// Load `<dir>/<language>.json`, or the English table if there is none
    pub fn load(dir: impl AsRef<Path>, language: Language) -> Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", language.identifier()));

        if !path.exists() {
            debug!("No string table at {}, using English", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read string table {}", path.display()))?;

        let mut strings: UiStrings = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid string table {}", path.display()))?;

        // Partially translated option lists keep the English names for the rest
        for (key, name) in Self::default().options {
            strings.options.entry(key).or_insert(name);
        }

        info!("Loaded {} string table", language);

        Ok(strings)
    }

    /// Localized name for a scheme, `others` for unlisted schemes
    pub fn scheme_name(&self, scheme: Scheme) -> &str {
        self.options
            .get(scheme.key())
            .map(String::as_str)
            .unwrap_or(&self.others)
    }
}
