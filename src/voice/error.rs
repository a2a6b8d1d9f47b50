/// Failures surfaced by the voice session manager
///
/// Listen failures reach the caller through the session outcome; synthesis
/// failures are logged and never returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The user or OS refused microphone access
    #[error("Microphone permission not granted")]
    PermissionDenied,

    /// No live recognition engine and no way to capture audio
    #[error("Speech recognition is not supported on this device. Please use text input.")]
    UnsupportedPlatform,

    /// Internal failure of a recognition or synthesis engine (message passed through verbatim)
    #[error("{0}")]
    EngineError(String),

    /// Transcription returned nothing usable or was rejected
    #[error("{0}")]
    TranscriptionFailed(String),

    /// A cloud service is needed but has no credential
    #[error("{0}")]
    ConfigurationMissing(String),
}

impl SpeechError {
    pub fn no_speech() -> Self {
        SpeechError::TranscriptionFailed("No speech detected. Please try again.".to_string())
    }

    pub fn missing_transcription_key() -> Self {
        SpeechError::ConfigurationMissing(
            "Voice recognition requires an OpenAI API key. Set openai.api_key in the config or use text input."
                .to_string(),
        )
    }
}
