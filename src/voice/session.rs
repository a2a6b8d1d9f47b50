use super::error::SpeechError;
use super::strategy::Strategy;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

/// Terminal result of a listen session: the transcript, or why there is none
pub type ListenOutcome = Result<String, SpeechError>;

/// Lifecycle of a listen session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeechStatus {
    Idle,
    Capturing,
    Finalizing,
    Completed,
    Failed,
    Cancelled,
}

impl SpeechStatus {
    /// Capturing or finalizing; at most one session per manager is ever active
    pub fn is_active(&self) -> bool {
        matches!(self, SpeechStatus::Capturing | SpeechStatus::Finalizing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SpeechStatus::Completed | SpeechStatus::Failed | SpeechStatus::Cancelled
        )
    }
}

/// Lifecycle of a speak request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SynthesisStatus {
    Idle,
    Speaking,
    Completed,
    Stopped,
    Failed,
}

impl SynthesisStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SynthesisStatus::Completed | SynthesisStatus::Stopped | SynthesisStatus::Failed
        )
    }
}

/// Caller's view of one listen session
///
/// The outcome resolves exactly once with a transcript or an error, or
/// resolves to `None` when the session was cancelled.
pub struct ListenHandle {
    id: Uuid,
    strategy: Strategy,
    partial: watch::Receiver<String>,
    status: watch::Receiver<SpeechStatus>,
    outcome: Option<oneshot::Receiver<ListenOutcome>>,
}

impl ListenHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Latest interim transcript (live recognition only)
    pub fn partial(&self) -> String {
        self.partial.borrow().clone()
    }

    pub fn status(&self) -> SpeechStatus {
        *self.status.borrow()
    }

    /// Wait for the terminal outcome; `None` if cancelled, ended without
    /// speech, or already taken
    pub async fn outcome(&mut self) -> Option<ListenOutcome> {
        let rx = self.outcome.take()?;
        rx.await.ok()
    }
}

/// Driver-side half of a listen session
pub(crate) struct SessionReporter {
    partial: watch::Sender<String>,
    status: watch::Sender<SpeechStatus>,
    shared: Arc<watch::Sender<SpeechStatus>>,
    outcome: oneshot::Sender<ListenOutcome>,
}

impl SessionReporter {
    fn set(&self, status: SpeechStatus) {
        self.status.send_replace(status);
        self.shared.send_replace(status);
    }

    pub(crate) fn capturing(&self) {
        self.set(SpeechStatus::Capturing);
    }

    pub(crate) fn finalizing(&self) {
        self.set(SpeechStatus::Finalizing);
    }

    pub(crate) fn partial(&self, transcript: &str) {
        self.partial.send_replace(transcript.to_string());
    }

    /// Deliver the outcome; consumes the reporter so it can only happen once
    pub(crate) fn finish(self, outcome: ListenOutcome) {
        let terminal = if outcome.is_ok() {
            SpeechStatus::Completed
        } else {
            SpeechStatus::Failed
        };
        self.status.send_replace(terminal);
        self.shared.send_replace(SpeechStatus::Idle);
        let _ = self.outcome.send(outcome);
    }

    /// The engine ended on its own with nothing to report
    pub(crate) fn end_silently(self) {
        self.status.send_replace(SpeechStatus::Idle);
        self.shared.send_replace(SpeechStatus::Idle);
    }

    /// End without an outcome
    pub(crate) fn cancel(self) {
        self.status.send_replace(SpeechStatus::Cancelled);
        self.shared.send_replace(SpeechStatus::Idle);
    }
}

pub(crate) fn listen_session(
    strategy: Strategy,
    shared: Arc<watch::Sender<SpeechStatus>>,
) -> (SessionReporter, ListenHandle) {
    let (partial_tx, partial_rx) = watch::channel(String::new());
    let (status_tx, status_rx) = watch::channel(SpeechStatus::Idle);
    let (outcome_tx, outcome_rx) = oneshot::channel();

    let reporter = SessionReporter {
        partial: partial_tx,
        status: status_tx,
        shared,
        outcome: outcome_tx,
    };

    let handle = ListenHandle {
        id: Uuid::new_v4(),
        strategy,
        partial: partial_rx,
        status: status_rx,
        outcome: Some(outcome_rx),
    };

    (reporter, handle)
}
