//! Per-strategy capture drivers
//!
//! Each listen session runs one driver task. The driver owns the engine or
//! recording for the session and releases it on every exit path before
//! reporting the outcome.

use super::engine::{LiveRecognizer, RecognitionEvent, Transcriber};
use super::error::SpeechError;
use super::session::SessionReporter;
use crate::audio::{AudioInput, PermissionStatus, RecordedClip};
use crate::locale::Language;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Instruction from the manager to a running driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// Finish normally and deliver an outcome
    Stop,
    /// Tear down without delivering anything
    Cancel,
}

/// Continuous live recognition
pub(crate) async fn run_live(
    recognizer: Arc<dyn LiveRecognizer>,
    language: Language,
    reporter: SessionReporter,
    started: oneshot::Sender<()>,
    mut control: oneshot::Receiver<Control>,
) {
    let (events_tx, mut events) = mpsc::unbounded_channel();

    if let Err(e) = recognizer.start(language.speech_tag(), events_tx).await {
        error!("Failed to start live recognition: {}", e);
        reporter.finish(Err(e));
        let _ = started.send(());
        return;
    }

    info!("Live recognition started ({})", language.speech_tag());
    reporter.capturing();
    let _ = started.send(());

    let mut latest: Option<String> = None;

    loop {
        tokio::select! {
            signal = &mut control => {
                recognizer.stop().await;

                if signal.unwrap_or(Control::Cancel) == Control::Cancel {
                    info!("Live recognition cancelled");
                    reporter.cancel();
                    return;
                }

                // Results the engine flushed before acknowledging the stop
                while let Ok(event) = events.try_recv() {
                    match event {
                        RecognitionEvent::Result { result_index, results } => {
                            if let Some(text) = RecognitionEvent::transcript(result_index, &results) {
                                reporter.partial(&text);
                                latest = Some(text);
                            }
                        }
                        RecognitionEvent::Error(message) => {
                            warn!("Recognition error during stop: {}", message);
                            reporter.finish(Err(SpeechError::EngineError(message)));
                            return;
                        }
                        RecognitionEvent::End => break,
                    }
                }

                match latest {
                    Some(text) => reporter.finish(Ok(text)),
                    None => reporter.cancel(),
                }
                return;
            }

            event = events.recv() => match event {
                Some(RecognitionEvent::Result { result_index, results }) => {
                    if let Some(text) = RecognitionEvent::transcript(result_index, &results) {
                        reporter.partial(&text);
                        latest = Some(text);
                    }
                }
                Some(RecognitionEvent::Error(message)) => {
                    warn!("Recognition error: {}", message);
                    recognizer.stop().await;
                    reporter.finish(Err(SpeechError::EngineError(message)));
                    return;
                }
                Some(RecognitionEvent::End) | None => {
                    info!("Live recognition ended by engine");
                    match latest {
                        Some(text) => reporter.finish(Ok(text)),
                        // Nothing was said: back to idle without an outcome
                        None => reporter.end_silently(),
                    }
                    return;
                }
            }
        }
    }
}

/// Record locally until stopped, then transcribe (or report the missing credential)
pub(crate) async fn run_recording(
    input: Option<Arc<dyn AudioInput>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    language: Language,
    reporter: SessionReporter,
    started: oneshot::Sender<()>,
    mut control: oneshot::Receiver<Control>,
) {
    let Some(input) = input else {
        warn!("No audio input available for recording");
        reporter.finish(Err(SpeechError::UnsupportedPlatform));
        let _ = started.send(());
        return;
    };

    match input.request_permission().await {
        PermissionStatus::Granted => {}
        PermissionStatus::Denied => {
            warn!("Microphone permission denied");
            reporter.finish(Err(SpeechError::PermissionDenied));
            let _ = started.send(());
            return;
        }
        PermissionStatus::Unavailable => {
            warn!("No audio input device available");
            reporter.finish(Err(SpeechError::UnsupportedPlatform));
            let _ = started.send(());
            return;
        }
    }

    let mut backend = match input.open() {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to open audio backend: {}", e);
            reporter.finish(Err(SpeechError::EngineError(format!(
                "Failed to start recording: {}",
                e
            ))));
            let _ = started.send(());
            return;
        }
    };

    let mut frames = match backend.start().await {
        Ok(rx) => rx,
        Err(e) => {
            error!("Failed to start {} capture: {}", backend.name(), e);
            if let Err(e) = backend.stop().await {
                warn!("Failed to release {} backend: {}", backend.name(), e);
            }
            reporter.finish(Err(SpeechError::EngineError(format!(
                "Failed to start recording: {}",
                e
            ))));
            let _ = started.send(());
            return;
        }
    };

    info!("Recording started on {} backend", backend.name());
    reporter.capturing();
    let _ = started.send(());

    let mut clip = RecordedClip::default();
    let mut source_open = true;

    let signal = loop {
        tokio::select! {
            signal = &mut control => break signal.unwrap_or(Control::Cancel),
            frame = frames.recv(), if source_open => match frame {
                Some(frame) => clip.push(frame),
                None => source_open = false,
            },
        }
    };

    if let Err(e) = backend.stop().await {
        warn!("Failed to stop {} backend: {}", backend.name(), e);
    }
    while let Ok(frame) = frames.try_recv() {
        clip.push(frame);
    }
    drop(frames);

    info!("Recording stopped: {:.1}s captured", clip.duration_seconds());

    if signal == Control::Cancel {
        reporter.cancel();
        return;
    }

    let Some(transcriber) = transcriber else {
        info!("Discarding recording: transcription is not configured");
        reporter.finish(Err(SpeechError::missing_transcription_key()));
        return;
    };

    reporter.finalizing();

    let outcome = match transcriber.transcribe(&clip, language.transcription_code()).await {
        Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Ok(_) => Err(SpeechError::no_speech()),
        Err(e) => {
            warn!("Transcription failed: {}", e);
            Err(e)
        }
    };

    reporter.finish(outcome);
}
