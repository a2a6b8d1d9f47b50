use super::engine::{LiveRecognizer, SpeechSynthesizer, Transcriber};
use crate::audio::AudioInput;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Speech capture strategy, fixed for the lifetime of one listen session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// Live engine with interim results
    BrowserRecognition,
    /// Record locally, transcribe in the cloud on stop
    CloudTranscription,
    /// Record locally, then report that transcription is not configured
    Unsupported,
}

/// Engines available on this platform
///
/// A transcriber should only be present when its credential is configured.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub live_recognizer: Option<Arc<dyn LiveRecognizer>>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub audio_input: Option<Arc<dyn AudioInput>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

/// Strategy selected for a session, holding the engine it dispatches to
#[derive(Clone)]
pub(crate) enum Capture {
    Live(Arc<dyn LiveRecognizer>),
    Cloud(Arc<dyn Transcriber>),
    Unsupported,
}

impl Capture {
    pub(crate) fn strategy(&self) -> Strategy {
        match self {
            Capture::Live(_) => Strategy::BrowserRecognition,
            Capture::Cloud(_) => Strategy::CloudTranscription,
            Capture::Unsupported => Strategy::Unsupported,
        }
    }
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live_recognizer(mut self, recognizer: Arc<dyn LiveRecognizer>) -> Self {
        self.live_recognizer = Some(recognizer);
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_audio_input(mut self, input: Arc<dyn AudioInput>) -> Self {
        self.audio_input = Some(input);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Strategy a listen request would use right now
    pub fn strategy(&self) -> Strategy {
        self.select().strategy()
    }

    pub(crate) fn select(&self) -> Capture {
        if let Some(recognizer) = &self.live_recognizer {
            Capture::Live(Arc::clone(recognizer))
        } else if let Some(transcriber) = &self.transcriber {
            Capture::Cloud(Arc::clone(transcriber))
        } else {
            Capture::Unsupported
        }
    }

    /// Whether speech can actually be turned into text
    pub fn can_recognize(&self) -> bool {
        self.live_recognizer.is_some() || self.transcriber.is_some()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("live_recognizer", &self.live_recognizer.is_some())
            .field("transcriber", &self.transcriber.is_some())
            .field("audio_input", &self.audio_input.is_some())
            .field("synthesizer", &self.synthesizer.is_some())
            .finish()
    }
}
