pub mod audio;
pub mod chat;
mod cloud;
pub mod config;
pub mod http;
pub mod locale;
pub mod realtime;
pub mod voice;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame, AudioInput,
    AudioSource, PermissionStatus, RecordedClip,
};
pub use chat::{ChatCompletion, ChatMessage, ChatRequest};
pub use config::Config;
pub use http::{create_router, AppState};
pub use locale::{ApplicationMode, Language, Scheme, UiStrings};
pub use realtime::{ChatRecord, RealtimeStore};
pub use voice::{
    Capabilities, ListenHandle, SpeechError, SpeechStatus, Strategy, SynthesisStatus,
    VoiceOptions, VoiceSessionManager,
};
