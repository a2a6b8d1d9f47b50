use super::capture::{self, Control};
use super::engine::{SpeakEnd, VoiceOptions};
use super::session::{self, ListenHandle, SpeechStatus, SynthesisStatus};
use super::strategy::{Capabilities, Capture, Strategy};
use crate::locale::Language;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// A listen session's driver task and its control channel
struct ActiveListen {
    id: Uuid,
    strategy: Strategy,
    control: Option<oneshot::Sender<Control>>,
    driver: JoinHandle<()>,
}

impl ActiveListen {
    /// Signal the driver and wait until it has released its resources
    async fn shutdown(mut self, signal: Control) {
        if let Some(control) = self.control.take() {
            // Fails only if the driver already ended on its own
            let _ = control.send(signal);
        }

        if let Err(e) = self.driver.await {
            error!("Listen session {} driver panicked: {}", self.id, e);
        }
    }
}

struct ActiveSynthesis {
    id: Uuid,
    stop_requested: Arc<AtomicBool>,
    interrupt: Option<oneshot::Sender<()>>,
    status: watch::Receiver<SynthesisStatus>,
    task: JoinHandle<()>,
}

/// Coordinates speech capture and speech synthesis for one UI
///
/// Owns at most one listen session and at most one speak session; starting a
/// new one of either kind stops the previous one first.
pub struct VoiceSessionManager {
    capabilities: Capabilities,
    defaults: VoiceOptions,
    listen: Mutex<Option<ActiveListen>>,
    listen_status: Arc<watch::Sender<SpeechStatus>>,
    synthesis: Mutex<Option<ActiveSynthesis>>,
}

impl VoiceSessionManager {
    pub fn new(capabilities: Capabilities, defaults: VoiceOptions) -> Self {
        info!("Creating voice session manager: {:?}", capabilities);

        let (listen_status, _) = watch::channel(SpeechStatus::Idle);

        Self {
            capabilities,
            defaults,
            listen: Mutex::new(None),
            listen_status: Arc::new(listen_status),
            synthesis: Mutex::new(None),
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Pure capability check: no recording, no permission request
    pub fn is_speech_recognition_available(&self) -> bool {
        self.capabilities.can_recognize()
    }

    /// Status of the current listen session, `Idle` when there is none
    pub fn listen_status(&self) -> SpeechStatus {
        *self.listen_status.borrow()
    }

    pub fn is_listening(&self) -> bool {
        self.listen_status().is_active()
    }

    // ------------------------------------------------------------------
    // Speech synthesis
    // ------------------------------------------------------------------

    /// Speak `text`, resolving when it finishes, is stopped, or fails
    ///
    /// Blank text is a no-op. Synthesis failures are logged and reported as
    /// `Failed`, never as an error.
    pub async fn speak(
        &self,
        text: &str,
        language: Language,
        options: Option<VoiceOptions>,
    ) -> SynthesisStatus {
        let text = text.trim();
        if text.is_empty() {
            return SynthesisStatus::Idle;
        }

        let Some(synthesizer) = self.capabilities.synthesizer.clone() else {
            warn!("No speech synthesizer available; skipping speech");
            return SynthesisStatus::Failed;
        };

        let id = Uuid::new_v4();
        let mut status = {
            let mut slot = self.synthesis.lock().await;

            if let Some(previous) = slot.take() {
                Self::halt(previous).await;
            }

            let (status_tx, status_rx) = watch::channel(SynthesisStatus::Speaking);
            let (interrupt_tx, interrupt_rx) = oneshot::channel();
            let stop_requested = Arc::new(AtomicBool::new(false));

            let task = {
                let stop_requested = Arc::clone(&stop_requested);
                let text = text.to_string();
                let tag = language.speech_tag();
                let options = options.unwrap_or(self.defaults);

                tokio::spawn(async move {
                    let status = match synthesizer.speak(&text, tag, &options, interrupt_rx).await {
                        Ok(SpeakEnd::Done) if !stop_requested.load(Ordering::SeqCst) => {
                            SynthesisStatus::Completed
                        }
                        Ok(_) => SynthesisStatus::Stopped,
                        Err(e) => {
                            warn!("Speech synthesis failed: {}", e);
                            SynthesisStatus::Failed
                        }
                    };
                    status_tx.send_replace(status);
                })
            };

            *slot = Some(ActiveSynthesis {
                id,
                stop_requested,
                interrupt: Some(interrupt_tx),
                status: status_rx.clone(),
                task,
            });

            status_rx
        };

        let result = match status.wait_for(SynthesisStatus::is_terminal).await {
            Ok(status) => *status,
            Err(_) => SynthesisStatus::Failed,
        };

        let mut slot = self.synthesis.lock().await;
        if slot.as_ref().is_some_and(|active| active.id == id) {
            *slot = None;
        }

        result
    }

    /// Stop the current utterance; no-op when nothing is speaking
    pub async fn stop_speaking(&self) {
        if let Some(previous) = self.synthesis.lock().await.take() {
            Self::halt(previous).await;
        }
    }

    pub async fn is_speaking(&self) -> bool {
        let slot = self.synthesis.lock().await;
        slot.as_ref()
            .is_some_and(|active| *active.status.borrow() == SynthesisStatus::Speaking)
    }

    /// Force a synthesis session to `Stopped` and wait for its audio to end
    async fn halt(mut session: ActiveSynthesis) {
        info!("Stopping speech session {}", session.id);

        session.stop_requested.store(true, Ordering::SeqCst);
        if let Some(interrupt) = session.interrupt.take() {
            // Fails only if the utterance already ended
            let _ = interrupt.send(());
        }

        let _ = session.status.wait_for(SynthesisStatus::is_terminal).await;
        if let Err(e) = session.task.await {
            error!("Speech task panicked: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Speech capture
    // ------------------------------------------------------------------

    /// Start a listen session, stopping (cancelling) any session in progress
    ///
    /// Returns once the capture engine has started or failed to start.
    /// Failures arrive through the handle's outcome, never from this call.
    pub async fn start_listening(&self, language: Language) -> ListenHandle {
        let mut slot = self.listen.lock().await;

        if let Some(previous) = slot.take() {
            info!(
                "Cancelling {:?} listen session {} for a new request",
                previous.strategy, previous.id
            );
            previous.shutdown(Control::Cancel).await;
        }

        let selected = self.capabilities.select();
        let strategy = selected.strategy();
        let (reporter, handle) = session::listen_session(strategy, Arc::clone(&self.listen_status));
        let (control_tx, control_rx) = oneshot::channel();
        let (started_tx, started_rx) = oneshot::channel();

        info!(
            "Starting listen session {} with {:?} ({})",
            handle.id(),
            strategy,
            language
        );

        let driver = match selected {
            Capture::Live(recognizer) => tokio::spawn(capture::run_live(
                recognizer,
                language,
                reporter,
                started_tx,
                control_rx,
            )),
            Capture::Cloud(transcriber) => tokio::spawn(capture::run_recording(
                self.capabilities.audio_input.clone(),
                Some(transcriber),
                language,
                reporter,
                started_tx,
                control_rx,
            )),
            Capture::Unsupported => tokio::spawn(capture::run_recording(
                self.capabilities.audio_input.clone(),
                None,
                language,
                reporter,
                started_tx,
                control_rx,
            )),
        };

        let _ = started_rx.await;

        *slot = Some(ActiveListen {
            id: handle.id(),
            strategy,
            control: Some(control_tx),
            driver,
        });

        handle
    }

    /// Stop the current listen session and wait for its outcome to be delivered
    ///
    /// Idempotent; resolves immediately when nothing is listening.
    pub async fn stop_listening(&self) {
        let mut slot = self.listen.lock().await;

        if let Some(active) = slot.take() {
            info!("Stopping {:?} listen session {}", active.strategy, active.id);
            active.shutdown(Control::Stop).await;
        }
    }

    /// Cancel any listen session without an outcome and stop speaking
    pub async fn dispose(&self) {
        if let Some(active) = self.listen.lock().await.take() {
            active.shutdown(Control::Cancel).await;
        }

        self.stop_speaking().await;

        info!("Voice session manager disposed");
    }
}
