//! Voice I/O session management
//!
//! This module provides the `VoiceSessionManager` that coordinates:
//! - Speech capture through one of three strategies (live recognition,
//!   record-then-transcribe, or an unsupported fallback)
//! - Speech synthesis with stop-before-start semantics
//! - Normalization of engine results into one outcome per listen session
//!
//! Engines are injected through [`Capabilities`]; concrete cloud and
//! command-line engines live in `whisper` and `synth`.

mod capture;
mod engine;
mod error;
mod manager;
mod session;
mod strategy;
mod synth;
mod whisper;

pub use engine::{LiveRecognizer, RecognitionEvent, SpeakEnd, SpeechSynthesizer, Transcriber, VoiceOptions};
pub use error::SpeechError;
pub use manager::VoiceSessionManager;
pub use session::{ListenHandle, ListenOutcome, SpeechStatus, SynthesisStatus};
pub use strategy::{Capabilities, Strategy};
pub use synth::CommandSynthesizer;
pub use whisper::WhisperClient;
