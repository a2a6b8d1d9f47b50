use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Frames buffered between the device callback and the consumer
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Whether the default host exposes an input device at all
pub fn has_input_device() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Default input device captured through cpal
///
/// cpal streams are not `Send` on every platform, so the stream lives on a
/// dedicated thread that holds it until `stop`.
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    is_capturing: Arc<AtomicBool>,
    shutdown: Option<std::sync::mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            is_capturing: Arc::new(AtomicBool::new(false)),
            shutdown: None,
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.worker.is_some() {
            bail!("Microphone capture already active");
        }

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();
        let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel::<()>();

        let downmix = self.config.target_channels == 1;
        let is_capturing = Arc::clone(&self.is_capturing);

        let worker = std::thread::Builder::new()
            .name("microphone".to_string())
            .spawn(move || {
                let stream = match open_stream(frame_tx, downmix) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(anyhow!("Failed to start input stream: {}", e)));
                    return;
                }

                is_capturing.store(true, Ordering::SeqCst);
                let _ = ready_tx.send(Ok(()));

                // Hold the stream until stopped or the backend is dropped
                let _ = shutdown_rx.recv();
                drop(stream);
                is_capturing.store(false, Ordering::SeqCst);
                debug!("Microphone stream closed");
            })
            .context("Failed to spawn microphone thread")?;

        self.shutdown = Some(shutdown_tx);
        self.worker = Some(worker);

        ready_rx
            .await
            .context("Microphone thread exited before starting")??;

        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || worker.join())
                .await
                .context("Failed to join microphone thread")?
                .map_err(|_| anyhow!("Microphone thread panicked"))?;
        }

        self.is_capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn open_stream(frames: mpsc::Sender<AudioFrame>, downmix: bool) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("No default input device available")?;

    let supported = device
        .default_input_config()
        .context("Failed to query input device configuration")?;
    let config: StreamConfig = supported.config();

    info!(
        "Using input device {} ({}Hz, {} channels, {:?})",
        device.name().unwrap_or_else(|_| "unknown".to_string()),
        config.sample_rate.0,
        config.channels,
        supported.sample_format()
    );

    match supported.sample_format() {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, frames, downmix),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, frames, downmix),
        SampleFormat::I32 => build_stream::<i32>(&device, &config, frames, downmix),
        SampleFormat::F32 => build_stream::<f32>(&device, &config, frames, downmix),
        other => bail!("Unsupported sample format: {:?}", other),
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    frames: mpsc::Sender<AudioFrame>,
    downmix: bool,
) -> Result<Stream>
where
    T: cpal::SizedSample + Send + 'static,
    i16: cpal::FromSample<T>,
{
    let sample_rate = config.sample_rate.0;
    let channels = config.channels.max(1);
    let out_channels = if downmix { 1 } else { channels };
    let mut captured: u64 = 0;

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples: Vec<i16> = data
                .iter()
                .map(|&s| cpal::Sample::to_sample::<i16>(s))
                .collect();

            let samples = if out_channels < channels {
                downmix_to_mono(&samples, channels)
            } else {
                samples
            };

            let timestamp_ms = captured * 1000 / sample_rate.max(1) as u64;
            captured += (samples.len() / out_channels as usize) as u64;

            let frame = AudioFrame {
                samples,
                sample_rate,
                channels: out_channels,
                timestamp_ms,
            };

            if let Err(e) = frames.try_send(frame) {
                warn!("Dropping microphone frame: {}", e);
            }
        },
        |err| error!("Microphone stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Average interleaved channels into one
pub(crate) fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    samples
        .chunks(channels.max(1) as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}
