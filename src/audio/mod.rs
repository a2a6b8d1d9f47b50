pub mod backend;
pub mod clip;
pub mod file;
pub mod microphone;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioInput, AudioSource, PermissionStatus};
pub use clip::RecordedClip;
pub use file::{AudioFile, FileBackend};
pub use microphone::MicrophoneBackend;
