// Integration tests for the voice session manager
//
// These tests drive the manager with in-process fake engines to verify
// strategy selection, session lifecycle, and outcome delivery.

use anyhow::Result;
use formfriend::audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioInput, AudioSource,
    PermissionStatus, RecordedClip,
};
use formfriend::voice::{
    Capabilities, ListenHandle, ListenOutcome, LiveRecognizer, RecognitionEvent, SpeakEnd,
    SpeechError, SpeechStatus, SpeechSynthesizer, Strategy, SynthesisStatus, Transcriber,
    VoiceOptions, VoiceSessionManager,
};
use formfriend::Language;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Fake engines
// ============================================================================

/// Synthesizer that "plays" for a while: 30s for texts containing "long", 20ms otherwise
#[derive(Default)]
struct FakeSynthesizer {
    log: Mutex<Vec<String>>,
    speaking: AtomicUsize,
    max_speaking: AtomicUsize,
    /// Time the engine takes before it starts playing and watching for interrupts
    startup_delay: Duration,
    fail: bool,
}

impl FakeSynthesizer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn slow_to_start(delay: Duration) -> Self {
        Self {
            startup_delay: delay,
            ..Self::default()
        }
    }

    fn speaking(&self) -> usize {
        self.speaking.load(Ordering::SeqCst)
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn speak(
        &self,
        text: &str,
        _speech_tag: &str,
        _options: &VoiceOptions,
        mut interrupt: oneshot::Receiver<()>,
    ) -> Result<SpeakEnd, SpeechError> {
        if self.fail {
            return Err(SpeechError::EngineError("audio device busy".to_string()));
        }

        if !self.startup_delay.is_zero() {
            tokio::time::sleep(self.startup_delay).await;
        }

        let now = self.speaking.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_speaking.fetch_max(now, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("start:{}", text));

        let duration = if text.contains("long") {
            Duration::from_secs(30)
        } else {
            Duration::from_millis(20)
        };

        let end = tokio::select! {
            _ = tokio::time::sleep(duration) => SpeakEnd::Done,
            Ok(()) = &mut interrupt => SpeakEnd::Stopped,
        };

        self.speaking.fetch_sub(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("end:{}:{:?}", text, end));

        Ok(end)
    }
}

/// Live recognizer whose events are pushed by the test
#[derive(Default)]
struct FakeRecognizer {
    events: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    last_tag: Mutex<Option<String>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    fail_start: Option<String>,
}

impl FakeRecognizer {
    fn emit(&self, event: RecognitionEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    fn result(&self, result_index: usize, results: &[&str]) {
        self.emit(RecognitionEvent::Result {
            result_index,
            results: results.iter().map(|s| s.to_string()).collect(),
        });
    }
}

#[async_trait::async_trait]
impl LiveRecognizer for FakeRecognizer {
    async fn start(
        &self,
        speech_tag: &str,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), SpeechError> {
        if let Some(message) = &self.fail_start {
            return Err(SpeechError::EngineError(message.clone()));
        }
        *self.last_tag.lock().unwrap() = Some(speech_tag.to_string());
        *self.events.lock().unwrap() = Some(events);
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        // Browsers fire `end` after a stop
        if let Some(tx) = self.events.lock().unwrap().take() {
            let _ = tx.send(RecognitionEvent::End);
        }
    }
}

/// Capture device replaying fixed frames
struct FakeInput {
    permission: PermissionStatus,
    frames: Vec<AudioFrame>,
    permission_requests: AtomicUsize,
    opened: AtomicUsize,
    stopped: Arc<AtomicUsize>,
}

impl FakeInput {
    fn new(permission: PermissionStatus, frame_count: usize) -> Self {
        let frames = (0..frame_count)
            .map(|i| AudioFrame {
                samples: vec![100; 1600],
                sample_rate: 16000,
                channels: 1,
                timestamp_ms: i as u64 * 100,
            })
            .collect();

        Self {
            permission,
            frames,
            permission_requests: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct FakeBackend {
    frames: Vec<AudioFrame>,
    capturing: AtomicBool,
    stopped: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl AudioBackend for FakeBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(self.frames.len().max(1));
        for frame in self.frames.drain(..) {
            tx.try_send(frame)?;
        }
        self.capturing.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[async_trait::async_trait]
impl AudioInput for FakeInput {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.permission
    }

    fn open(&self) -> Result<Box<dyn AudioBackend>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBackend {
            frames: self.frames.clone(),
            capturing: AtomicBool::new(false),
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

/// Transcriber returning a canned reply
struct FakeTranscriber {
    reply: Result<String, SpeechError>,
    calls: AtomicUsize,
    last_language: Mutex<Option<String>>,
    last_samples: AtomicUsize,
}

impl FakeTranscriber {
    fn new(reply: Result<String, SpeechError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_language: Mutex::new(None),
            last_samples: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, clip: &RecordedClip, language_code: &str) -> Result<String, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_language.lock().unwrap() = Some(language_code.to_string());
        self.last_samples.store(clip.samples.len(), Ordering::SeqCst);
        self.reply.clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn manager(capabilities: Capabilities) -> Arc<VoiceSessionManager> {
    Arc::new(VoiceSessionManager::new(capabilities, VoiceOptions::default()))
}

async fn outcome(handle: &mut ListenHandle) -> Option<ListenOutcome> {
    tokio::time::timeout(TIMEOUT, handle.outcome())
        .await
        .expect("listen outcome timed out")
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Strategy selection and capability check
// ============================================================================

#[test]
fn test_live_recognition_preferred_over_cloud() {
    let capabilities = Capabilities::new()
        .with_live_recognizer(Arc::new(FakeRecognizer::default()))
        .with_transcriber(Arc::new(FakeTranscriber::new(Ok("x".to_string()))));

    assert_eq!(capabilities.strategy(), Strategy::BrowserRecognition);
}

#[test]
fn test_cloud_selected_when_credential_configured() {
    let capabilities = Capabilities::new()
        .with_transcriber(Arc::new(FakeTranscriber::new(Ok("x".to_string()))));

    assert_eq!(capabilities.strategy(), Strategy::CloudTranscription);
}

#[test]
fn test_unsupported_without_engines() {
    assert_eq!(Capabilities::new().strategy(), Strategy::Unsupported);
}

#[tokio::test]
async fn test_recognition_unavailable_check_has_no_side_effects() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 3));
    let manager = manager(Capabilities::new().with_audio_input(input.clone()));

    assert!(!manager.is_speech_recognition_available());
    assert_eq!(input.permission_requests.load(Ordering::SeqCst), 0);
    assert_eq!(input.opened.load(Ordering::SeqCst), 0);
    assert_eq!(manager.listen_status(), SpeechStatus::Idle);
}

#[tokio::test]
async fn test_recognition_available_with_either_engine() {
    let live = manager(Capabilities::new().with_live_recognizer(Arc::new(FakeRecognizer::default())));
    assert!(live.is_speech_recognition_available());

    let cloud = manager(
        Capabilities::new().with_transcriber(Arc::new(FakeTranscriber::new(Ok(String::new())))),
    );
    assert!(cloud.is_speech_recognition_available());
}

// ============================================================================
// Live (browser-class) recognition
// ============================================================================

#[tokio::test]
async fn test_live_recognition_delivers_latest_pass() -> Result<()> {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut handle = manager.start_listening(Language::Hindi).await;
    assert_eq!(handle.strategy(), Strategy::BrowserRecognition);
    assert_eq!(handle.status(), SpeechStatus::Capturing);
    assert!(manager.is_listening());
    assert_eq!(recognizer.last_tag.lock().unwrap().as_deref(), Some("hi-IN"));

    recognizer.result(0, &["hel"]);
    recognizer.result(0, &["hello world"]);

    manager.stop_listening().await;

    assert_eq!(outcome(&mut handle).await, Some(Ok("hello world".to_string())));
    assert_eq!(handle.partial(), "hello world");
    assert_eq!(handle.status(), SpeechStatus::Completed);
    assert_eq!(manager.listen_status(), SpeechStatus::Idle);
    assert_eq!(recognizer.stops.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_live_recognition_concatenates_segments_from_result_index() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut handle = manager.start_listening(Language::English).await;
    recognizer.result(1, &["already sent ", "apply for ", "PM Kisan "]);
    manager.stop_listening().await;

    assert_eq!(outcome(&mut handle).await, Some(Ok("apply for PM Kisan".to_string())));
}

#[tokio::test]
async fn test_live_recognition_engine_end_completes_session() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut handle = manager.start_listening(Language::Telugu).await;
    recognizer.result(0, &["namaste"]);
    recognizer.emit(RecognitionEvent::End);

    assert_eq!(outcome(&mut handle).await, Some(Ok("namaste".to_string())));
    wait_until(|| manager.listen_status() == SpeechStatus::Idle).await;

    // Nothing left to stop
    manager.stop_listening().await;
    assert_eq!(handle.status(), SpeechStatus::Completed);
}

#[tokio::test]
async fn test_engine_end_without_speech_returns_to_idle() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut handle = manager.start_listening(Language::Hindi).await;
    recognizer.emit(RecognitionEvent::End);

    assert_eq!(outcome(&mut handle).await, None);
    assert_eq!(handle.status(), SpeechStatus::Idle, "Engine end is not a cancellation");
    assert_eq!(manager.listen_status(), SpeechStatus::Idle);
}

#[tokio::test]
async fn test_live_recognition_error_passed_verbatim() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut handle = manager.start_listening(Language::English).await;
    recognizer.result(0, &["partial words"]);
    recognizer.emit(RecognitionEvent::Error("network".to_string()));

    assert_eq!(
        outcome(&mut handle).await,
        Some(Err(SpeechError::EngineError("network".to_string())))
    );
    assert_eq!(handle.status(), SpeechStatus::Failed);
    wait_until(|| !manager.is_listening()).await;
}

#[tokio::test]
async fn test_live_recognition_start_failure_reported_through_outcome() {
    let recognizer = Arc::new(FakeRecognizer {
        fail_start: Some("not-allowed".to_string()),
        ..FakeRecognizer::default()
    });
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer));

    let mut handle = manager.start_listening(Language::English).await;

    assert_eq!(
        outcome(&mut handle).await,
        Some(Err(SpeechError::EngineError("not-allowed".to_string())))
    );
    assert!(!manager.is_listening());
}

#[tokio::test]
async fn test_live_recognition_stop_without_speech_is_cancellation() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer));

    let mut handle = manager.start_listening(Language::English).await;
    manager.stop_listening().await;

    assert_eq!(outcome(&mut handle).await, None);
    assert_eq!(handle.status(), SpeechStatus::Cancelled);
}

#[tokio::test]
async fn test_new_listen_cancels_previous_session() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    let mut first = manager.start_listening(Language::English).await;
    recognizer.result(0, &["old words"]);

    let mut second = manager.start_listening(Language::English).await;

    // The superseded session ends silently
    assert_eq!(outcome(&mut first).await, None);
    assert_eq!(first.status(), SpeechStatus::Cancelled);
    assert_ne!(first.id(), second.id());

    recognizer.result(0, &["new words"]);
    manager.stop_listening().await;

    assert_eq!(outcome(&mut second).await, Some(Ok("new words".to_string())));
    assert_eq!(recognizer.starts.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Cloud transcription
// ============================================================================

#[tokio::test]
async fn test_cloud_transcribes_only_after_stop() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 5));
    let transcriber = Arc::new(FakeTranscriber::new(Ok("  मुझे राशन कार्ड चाहिए  ".to_string())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber.clone()),
    );

    let mut handle = manager.start_listening(Language::Hindi).await;
    assert_eq!(handle.strategy(), Strategy::CloudTranscription);
    assert_eq!(handle.status(), SpeechStatus::Capturing);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transcriber.calls(), 0, "No transcription before stop");

    manager.stop_listening().await;

    assert_eq!(
        outcome(&mut handle).await,
        Some(Ok("मुझे राशन कार्ड चाहिए".to_string()))
    );
    assert_eq!(transcriber.calls(), 1);
    assert_eq!(transcriber.last_language.lock().unwrap().as_deref(), Some("hi"));
    assert_eq!(transcriber.last_samples.load(Ordering::SeqCst), 5 * 1600);
    assert_eq!(input.stopped(), 1, "Recording must be released");
    assert_eq!(manager.listen_status(), SpeechStatus::Idle);
}

#[tokio::test]
async fn test_cloud_empty_transcript_is_no_speech_error() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 2));
    let transcriber = Arc::new(FakeTranscriber::new(Ok("   ".to_string())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber),
    );

    let mut handle = manager.start_listening(Language::English).await;
    manager.stop_listening().await;

    assert_eq!(outcome(&mut handle).await, Some(Err(SpeechError::no_speech())));
    assert_eq!(handle.status(), SpeechStatus::Failed);
    assert_eq!(input.stopped(), 1);
}

#[tokio::test]
async fn test_cloud_transcription_failure_surfaces_error() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 2));
    let failure = SpeechError::TranscriptionFailed("network down".to_string());
    let transcriber = Arc::new(FakeTranscriber::new(Err(failure.clone())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber),
    );

    let mut handle = manager.start_listening(Language::Kannada).await;
    manager.stop_listening().await;

    assert_eq!(outcome(&mut handle).await, Some(Err(failure)));
    assert_eq!(input.stopped(), 1);
    assert!(!manager.is_listening());
}

#[tokio::test]
async fn test_cloud_permission_denied() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Denied, 2));
    let transcriber = Arc::new(FakeTranscriber::new(Ok("hello".to_string())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber.clone()),
    );

    let mut handle = manager.start_listening(Language::English).await;

    assert_eq!(outcome(&mut handle).await, Some(Err(SpeechError::PermissionDenied)));
    assert_eq!(input.opened.load(Ordering::SeqCst), 0);
    assert_eq!(transcriber.calls(), 0);
    assert!(!manager.is_listening());

    // The failed session is already over
    manager.stop_listening().await;
}

#[tokio::test]
async fn test_dispose_cancels_recording_without_outcome() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 3));
    let transcriber = Arc::new(FakeTranscriber::new(Ok("hello".to_string())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber.clone()),
    );

    let mut handle = manager.start_listening(Language::English).await;
    manager.dispose().await;

    assert_eq!(outcome(&mut handle).await, None);
    assert_eq!(handle.status(), SpeechStatus::Cancelled);
    assert_eq!(transcriber.calls(), 0);
    assert_eq!(input.stopped(), 1);
}

#[tokio::test]
async fn test_missing_input_device_is_unsupported_not_denied() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Unavailable, 0));
    let transcriber = Arc::new(FakeTranscriber::new(Ok("hello".to_string())));
    let manager = manager(
        Capabilities::new()
            .with_audio_input(input.clone())
            .with_transcriber(transcriber.clone()),
    );

    let mut handle = manager.start_listening(Language::English).await;

    assert_eq!(outcome(&mut handle).await, Some(Err(SpeechError::UnsupportedPlatform)));
    assert_eq!(input.opened.load(Ordering::SeqCst), 0);
    assert_eq!(transcriber.calls(), 0);
    assert!(!manager.is_listening());
}

#[tokio::test]
async fn test_system_microphone_never_reports_permission_denied() {
    // Whatever this host has (no device, a broken device, or a working one),
    // none of it is a refusal by the user
    let microphone = AudioBackendFactory::new(AudioSource::Microphone, AudioBackendConfig::default());
    let manager = manager(Capabilities::new().with_audio_input(Arc::new(microphone)));

    let mut handle = manager.start_listening(Language::English).await;
    manager.stop_listening().await;

    let result = outcome(&mut handle).await;
    assert!(matches!(result, Some(Err(_))), "got {:?}", result);
    assert_ne!(result, Some(Err(SpeechError::PermissionDenied)));
}

// ============================================================================
// Unsupported fallback
// ============================================================================

#[tokio::test]
async fn test_unsupported_records_then_reports_missing_configuration() {
    let input = Arc::new(FakeInput::new(PermissionStatus::Granted, 2));
    let manager = manager(Capabilities::new().with_audio_input(input.clone()));

    let mut handle = manager.start_listening(Language::Gujarati).await;
    assert_eq!(handle.strategy(), Strategy::Unsupported);
    assert_eq!(handle.status(), SpeechStatus::Capturing);

    manager.stop_listening().await;

    match outcome(&mut handle).await {
        Some(Err(SpeechError::ConfigurationMissing(message))) => {
            assert!(message.contains("API key"), "unexpected message: {}", message);
        }
        other => panic!("expected ConfigurationMissing, got {:?}", other),
    }
    assert_eq!(input.opened.load(Ordering::SeqCst), 1);
    assert_eq!(input.stopped(), 1);
}

#[tokio::test]
async fn test_unsupported_without_audio_input() {
    let manager = manager(Capabilities::new());

    let mut handle = manager.start_listening(Language::English).await;

    assert_eq!(outcome(&mut handle).await, Some(Err(SpeechError::UnsupportedPlatform)));
}

#[tokio::test]
async fn test_stop_listening_when_idle_is_noop() {
    let recognizer = Arc::new(FakeRecognizer::default());
    let manager = manager(Capabilities::new().with_live_recognizer(recognizer.clone()));

    manager.stop_listening().await;
    manager.stop_listening().await;

    assert_eq!(recognizer.stops.load(Ordering::SeqCst), 0);
    assert_eq!(manager.listen_status(), SpeechStatus::Idle);
}

// ============================================================================
// Speech synthesis
// ============================================================================

#[tokio::test]
async fn test_speak_completes() {
    let synth = Arc::new(FakeSynthesizer::default());
    let manager = manager(Capabilities::new().with_synthesizer(synth.clone()));

    let status = manager.speak("Welcome to FormFriend", Language::English, None).await;

    assert_eq!(status, SynthesisStatus::Completed);
    assert!(!manager.is_speaking().await);
    assert_eq!(
        synth.log(),
        vec![
            "start:Welcome to FormFriend".to_string(),
            "end:Welcome to FormFriend:Done".to_string()
        ]
    );
}

#[tokio::test]
async fn test_blank_text_is_noop() {
    let synth = Arc::new(FakeSynthesizer::default());
    let manager = manager(Capabilities::new().with_synthesizer(synth.clone()));

    assert_eq!(manager.speak("   \n", Language::Hindi, None).await, SynthesisStatus::Idle);
    assert!(synth.log().is_empty());
}

#[tokio::test]
async fn test_new_speech_stops_previous_first() {
    let synth = Arc::new(FakeSynthesizer::default());
    let manager = manager(Capabilities::new().with_synthesizer(synth.clone()));

    let first = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.speak("long answer", Language::English, None).await })
    };
    wait_until(|| synth.speaking() == 1).await;
    assert!(manager.is_speaking().await);

    let second = manager.speak("short answer", Language::English, None).await;

    assert_eq!(first.await.unwrap(), SynthesisStatus::Stopped);
    assert_eq!(second, SynthesisStatus::Completed);
    assert_eq!(synth.max_speaking.load(Ordering::SeqCst), 1, "Never two voices at once");
    assert_eq!(
        synth.log(),
        vec![
            "start:long answer".to_string(),
            "end:long answer:Stopped".to_string(),
            "start:short answer".to_string(),
            "end:short answer:Done".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_stop_speaking() {
    let synth = Arc::new(FakeSynthesizer::default());
    let manager = manager(Capabilities::new().with_synthesizer(synth.clone()));

    // Idle stop is a no-op
    manager.stop_speaking().await;

    let speech = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.speak("long reply", Language::Kannada, None).await })
    };
    wait_until(|| synth.speaking() == 1).await;

    manager.stop_speaking().await;
    manager.stop_speaking().await;

    assert_eq!(speech.await.unwrap(), SynthesisStatus::Stopped);
    assert_eq!(synth.speaking(), 0);
}

#[tokio::test]
async fn test_stop_before_engine_starts_still_interrupts() {
    let synth = Arc::new(FakeSynthesizer::slow_to_start(Duration::from_millis(50)));
    let manager = manager(Capabilities::new().with_synthesizer(synth.clone()));

    let speech = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.speak("long welcome", Language::English, None).await })
    };

    // Registered with the manager, but the engine has not begun yet
    tokio::time::timeout(TIMEOUT, async {
        while !manager.is_speaking().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("speech never registered");
    assert_eq!(synth.speaking(), 0);

    manager.stop_speaking().await;

    let status = tokio::time::timeout(TIMEOUT, speech)
        .await
        .expect("stopped speech kept playing")
        .unwrap();
    assert_eq!(status, SynthesisStatus::Stopped);
    assert_eq!(
        synth.log(),
        vec!["start:long welcome".to_string(), "end:long welcome:Stopped".to_string()]
    );
}

#[tokio::test]
async fn test_synthesis_failure_is_absorbed() {
    let manager = manager(Capabilities::new().with_synthesizer(Arc::new(FakeSynthesizer::failing())));

    let status = manager.speak("hello", Language::English, None).await;

    assert_eq!(status, SynthesisStatus::Failed);
    assert!(!manager.is_speaking().await);
}

#[tokio::test]
async fn test_speak_without_synthesizer() {
    let manager = manager(Capabilities::new());

    assert_eq!(
        manager.speak("hello", Language::English, None).await,
        SynthesisStatus::Failed
    );
}
