use super::engine::Transcriber;
use super::error::SpeechError;
use crate::audio::RecordedClip;
use crate::cloud;
use crate::config::OpenAiConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// OpenAI Whisper transcription client
pub struct WhisperClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl WhisperClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            http: cloud::http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.credential().map(str::to_string),
            config.transcription_model.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, clip: &RecordedClip, language_code: &str) -> Result<String, SpeechError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(SpeechError::missing_transcription_key)?;

        let wav = clip
            .to_wav_bytes()
            .map_err(|e| SpeechError::EngineError(format!("Failed to encode recording: {}", e)))?;

        info!(
            "Transcribing {:.1}s clip ({} bytes, language={})",
            clip.duration_seconds(),
            wav.len(),
            language_code
        );

        let part = Part::bytes(wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| SpeechError::EngineError(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", language_code.to_string());

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::TranscriptionFailed(format!("Failed to transcribe audio: {}", e)))?;

        if !response.status().is_success() {
            let message = cloud::error_message(response, "API Error").await;
            return Err(SpeechError::TranscriptionFailed(message));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::TranscriptionFailed(format!("Invalid transcription response: {}", e)))?;

        debug!("Transcription result: {:?}", body.text);

        Ok(body.text)
    }
}
