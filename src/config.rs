use anyhow::Result;
use serde::Deserialize;

/// Values shipped in template configs that mean "no key set"
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_API_KEY_HERE", "YOUR_GEMINI_API_KEY_HERE"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub chat: ChatConfig,
    pub realtime: RealtimeConfig,
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Directory holding `<language>.json` UI string tables
    pub locales_dir: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "FormFriend Backend".to_string(),
            http: HttpConfig::default(),
            locales_dir: "locales".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub realtime_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            transcription_model: "whisper-1".to_string(),
            realtime_model: "gpt-4o-mini-realtime-preview".to_string(),
        }
    }
}

impl OpenAiConfig {
    /// The API key, if one is actually configured
    pub fn credential(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn credential(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub provider: ChatProvider,
    /// Number of most recent messages forwarded as context
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::OpenAi,
            history_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeBackend {
    Memory,
    Nats,
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub backend: RealtimeBackend,
    pub nats_url: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            backend: RealtimeBackend::Memory,
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// TTS program invoked by the command synthesizer (espeak-ng compatible flags)
    pub synthesizer_command: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            synthesizer_command: "espeak-ng".to_string(),
            pitch: 1.0,
            rate: 0.9,
            volume: 1.0,
        }
    }
}

impl Config {
    /// Load configuration from an optional file, overlaid by `FORMFRIEND__*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FORMFRIEND")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn credential(key: &Option<String>) -> Option<&str> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty() && !PLACEHOLDER_KEYS.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_is_not_a_credential() {
        let mut openai = OpenAiConfig::default();
        assert_eq!(openai.credential(), None);

        openai.api_key = Some("YOUR_API_KEY_HERE".to_string());
        assert_eq!(openai.credential(), None);

        openai.api_key = Some("   ".to_string());
        assert_eq!(openai.credential(), None);

        openai.api_key = Some("sk-test".to_string());
        assert_eq!(openai.credential(), Some("sk-test"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = Config::load("/nonexistent/formfriend").unwrap();
        assert_eq!(cfg.service.http.port, 3001);
        assert_eq!(cfg.chat.history_limit, 10);
        assert_eq!(cfg.chat.provider, ChatProvider::OpenAi);
        assert_eq!(cfg.realtime.backend, RealtimeBackend::Memory);
        assert!((cfg.voice.rate - 0.9).abs() < f32::EPSILON);
    }
}
