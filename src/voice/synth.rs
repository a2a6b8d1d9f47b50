use super::engine::{SpeakEnd, SpeechSynthesizer, VoiceOptions};
use super::error::SpeechError;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// espeak-ng's default speaking rate in words per minute
const BASE_WPM: f32 = 175.0;

/// Speech synthesis through a local TTS program with espeak-ng compatible flags
pub struct CommandSynthesizer {
    program: String,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one utterance (text excluded)
    pub fn arguments(speech_tag: &str, options: &VoiceOptions) -> Vec<String> {
        let voice = match speech_tag.split('-').next().unwrap_or("en") {
            "en" => "en-us".to_string(),
            primary => primary.to_ascii_lowercase(),
        };
        let wpm = (BASE_WPM * options.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (50.0 * options.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (100.0 * options.volume).round().clamp(0.0, 200.0) as u32;

        vec![
            "-v".to_string(),
            voice,
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(
        &self,
        text: &str,
        speech_tag: &str,
        options: &VoiceOptions,
        mut interrupt: oneshot::Receiver<()>,
    ) -> Result<SpeakEnd, SpeechError> {
        if interrupt.try_recv().is_ok() {
            debug!("Speech stopped before {} started", self.program);
            return Ok(SpeakEnd::Stopped);
        }

        let mut child = Command::new(&self.program)
            .args(Self::arguments(speech_tag, options))
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::EngineError(format!("Failed to start {}: {}", self.program, e)))?;

        debug!("Speaking {} chars with {}", text.len(), self.program);

        let finished = tokio::select! {
            status = child.wait() => Some(status),
            Ok(()) = &mut interrupt => None,
        };

        match finished {
            Some(status) => {
                let status = status
                    .map_err(|e| SpeechError::EngineError(format!("{} failed: {}", self.program, e)))?;
                if !status.success() {
                    return Err(SpeechError::EngineError(format!(
                        "{} exited with {}",
                        self.program, status
                    )));
                }
                Ok(SpeakEnd::Done)
            }
            None => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", self.program, e);
                }
                Ok(SpeakEnd::Stopped)
            }
        }
    }
}
