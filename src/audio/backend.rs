use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::file::FileBackend;
use super::microphone::{self, MicrophoneBackend};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Target sample rate (will resample if needed)
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz for Whisper
            target_channels: 1,        // Mono
            buffer_duration_ms: 100,   // 100ms buffers
        }
    }
}

/// Audio capture backend trait
///
/// One backend instance serves one capture session.
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    /// The user or OS refused access
    Denied,
    /// There is no input device to ask about
    Unavailable,
}

/// A capture device that can hand out fresh backends
#[async_trait::async_trait]
pub trait AudioInput: Send + Sync {
    /// Ask the platform for microphone access
    async fn request_permission(&self) -> PermissionStatus;

    /// Open a new backend for one capture session
    fn open(&self) -> Result<Box<dyn AudioBackend>>;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Default system input device
    Microphone,
    /// File input (WAV replayed as live frames)
    File(PathBuf),
}

/// Audio backend factory
#[derive(Debug, Clone)]
pub struct AudioBackendFactory {
    source: AudioSource,
    config: AudioBackendConfig,
}

impl AudioBackendFactory {
    pub fn new(source: AudioSource, config: AudioBackendConfig) -> Self {
        Self { source, config }
    }

    /// Create audio backend based on source and configuration
    pub fn create(&self) -> Result<Box<dyn AudioBackend>> {
        match &self.source {
            AudioSource::Microphone => {
                Ok(Box::new(MicrophoneBackend::new(self.config.clone())))
            }

            AudioSource::File(path) => {
                let backend = FileBackend::new(path.clone(), self.config.clone());
                Ok(Box::new(backend))
            }
        }
    }
}

#[async_trait::async_trait]
impl AudioInput for AudioBackendFactory {
    async fn request_permission(&self) -> PermissionStatus {
        match self.source {
            AudioSource::File(_) => PermissionStatus::Granted,
            // Desktop hosts grant access when the stream opens; only the device can be missing
            AudioSource::Microphone => {
                let present = tokio::task::spawn_blocking(microphone::has_input_device)
                    .await
                    .unwrap_or(false);
                if present {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Unavailable
                }
            }
        }
    }

    fn open(&self) -> Result<Box<dyn AudioBackend>> {
        self.create()
    }
}
