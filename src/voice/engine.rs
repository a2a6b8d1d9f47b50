use super::error::SpeechError;
use crate::audio::RecordedClip;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

/// Prosody parameters for one utterance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceOptions {
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 0.9,
            volume: 1.0,
        }
    }
}

/// How a synthesis request ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakEnd {
    Done,
    Stopped,
}

/// Text-to-speech engine
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, resolving when playback finishes or `interrupt` fires
    ///
    /// An interrupt sent before playback starts must still stop the utterance.
    async fn speak(
        &self,
        text: &str,
        speech_tag: &str,
        options: &VoiceOptions,
        interrupt: oneshot::Receiver<()>,
    ) -> Result<SpeakEnd, SpeechError>;
}

/// Event delivered by a live recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Results of the current recognition pass; segments from `result_index` on are new
    Result {
        result_index: usize,
        results: Vec<String>,
    },
    /// Engine error code or message
    Error(String),
    /// The engine ended the session
    End,
}

impl RecognitionEvent {
    /// Concatenated transcript of one result event, if it says anything
    pub fn transcript(result_index: usize, results: &[String]) -> Option<String> {
        let text = results.get(result_index..).unwrap_or(&[]).concat();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Continuous recognition engine with interim results (browser-class)
#[async_trait::async_trait]
pub trait LiveRecognizer: Send + Sync {
    /// Begin continuous recognition, delivering events on `events`
    async fn start(
        &self,
        speech_tag: &str,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), SpeechError>;

    /// End recognition; pending results may still be flushed to the event channel
    async fn stop(&self);
}

/// Record-then-transcribe engine
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: &RecordedClip, language_code: &str) -> Result<String, SpeechError>;
}
