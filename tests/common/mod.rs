//! Recording test doubles for the orchestrator's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

use lingo_widget::clipboard::Clipboard;
use lingo_widget::error::{ClipboardError, PlaybackError, RequestError};
use lingo_widget::translate::{
    SpeechRequest, SpeechResponse, Translation, TranslationRequest, TranslationService,
};
use lingo_widget::tts::{
    AudioClip, AudioPlayer, PlayableResource, PlaybackControl, PlaybackOutcome,
    SpeechSynthesizer, StartedPlayback, Utterance,
};
use lingo_widget::ui::{Control, Indicator, TextField, UiSurface};
use lingo_widget::{Collaborators, Orchestrator, OrchestratorSettings};

/// Shared, ordered record of side effects across doubles.
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct RecordingUi {
    enabled: Mutex<HashMap<Control, bool>>,
    visible: Mutex<HashMap<Indicator, bool>>,
    texts: Mutex<HashMap<TextField, String>>,
}

impl RecordingUi {
    pub fn enabled(&self, control: Control) -> bool {
        self.enabled.lock().get(&control).copied().unwrap_or(false)
    }

    pub fn visible(&self, indicator: Indicator) -> bool {
        self.visible.lock().get(&indicator).copied().unwrap_or(false)
    }

    pub fn text(&self, field: TextField) -> String {
        self.texts.lock().get(&field).cloned().unwrap_or_default()
    }
}

impl UiSurface for RecordingUi {
    fn set_enabled(&self, control: Control, enabled: bool) {
        self.enabled.lock().insert(control, enabled);
    }

    fn set_visible(&self, indicator: Indicator, visible: bool) {
        self.visible.lock().insert(indicator, visible);
    }

    fn set_text(&self, field: TextField, text: &str) {
        self.texts.lock().insert(field, text.to_string());
    }
}

type Scripted<T> = (Option<Duration>, Result<T, RequestError>);

#[derive(Default)]
pub struct MockService {
    translations: Mutex<VecDeque<Scripted<Translation>>>,
    speech: Mutex<VecDeque<Result<SpeechResponse, RequestError>>>,
    pub translate_calls: AtomicUsize,
    pub speech_calls: AtomicUsize,
    pub requests: Mutex<Vec<TranslationRequest>>,
}

impl MockService {
    pub fn reply(&self, result: Result<Translation, RequestError>) {
        self.translations.lock().push_back((None, result));
    }

    pub fn reply_after(&self, delay: Duration, result: Result<Translation, RequestError>) {
        self.translations.lock().push_back((Some(delay), result));
    }

    pub fn reply_speech(&self, result: Result<SpeechResponse, RequestError>) {
        self.speech.lock().push_back(result);
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn speech_calls(&self) -> usize {
        self.speech_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationService for MockService {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, RequestError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        let (delay, result) = self
            .translations
            .lock()
            .pop_front()
            .expect("unexpected translate call");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn synthesize_speech(
        &self,
        _request: &SpeechRequest,
    ) -> Result<SpeechResponse, RequestError> {
        self.speech_calls.fetch_add(1, Ordering::SeqCst);
        self.speech.lock().pop_front().expect("unexpected speech call")
    }
}

struct LoggedControl {
    name: String,
    log: EventLog,
}

impl PlaybackControl for LoggedControl {
    fn stop(&mut self) {
        self.log.lock().push(format!("stop {}", self.name));
    }
}

/// Playbacks started by the doubles; tests end them explicitly.
#[derive(Default)]
pub struct Finishers(Mutex<Vec<oneshot::Sender<PlaybackOutcome>>>);

impl Finishers {
    fn started(&self, log: &EventLog, name: String) -> StartedPlayback {
        let (tx, rx) = oneshot::channel();
        self.0.lock().push(tx);
        StartedPlayback::new(
            Box::new(LoggedControl {
                name,
                log: log.clone(),
            }),
            rx,
        )
    }

    /// Complete the most recent playback with `outcome`.
    pub fn finish_last(&self, outcome: PlaybackOutcome) {
        let tx = self.0.lock().pop().expect("no playback started");
        let _ = tx.send(outcome);
    }
}

pub struct MockSynthesizer {
    pub available: bool,
    pub log: EventLog,
    pub finishers: Finishers,
    pub utterances: Mutex<Vec<Utterance>>,
    /// Per-call start delays, consumed in order.
    pub delays: Mutex<VecDeque<Duration>>,
    count: AtomicUsize,
}

impl MockSynthesizer {
    pub fn new(available: bool, log: EventLog) -> Self {
        Self {
            available,
            log,
            finishers: Finishers::default(),
            utterances: Mutex::new(Vec::new()),
            delays: Mutex::new(VecDeque::new()),
            count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn speak(&self, utterance: Utterance) -> Result<StartedPlayback, PlaybackError> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("speech{}", n);
        self.log.lock().push(format!("start {}", name));
        self.utterances.lock().push(utterance);
        let delay = self.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.finishers.started(&self.log, name))
    }
}

pub struct MockPlayer {
    pub log: EventLog,
    pub finishers: Finishers,
    pub fail_play: bool,
    /// Per-call start delays, consumed in order.
    pub delays: Mutex<VecDeque<Duration>>,
}

impl MockPlayer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            finishers: Finishers::default(),
            fail_play: false,
            delays: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl AudioPlayer for MockPlayer {
    fn load(&self, clip: AudioClip) -> Result<PlayableResource, PlaybackError> {
        self.log
            .lock()
            .push(format!("load {} bytes {}", clip.data.len(), clip.mime_type));
        Ok(PlayableResource {
            id: Uuid::new_v4(),
            location: "clip".to_string(),
            mime_type: clip.mime_type,
        })
    }

    async fn play(&self, resource: &PlayableResource) -> Result<StartedPlayback, PlaybackError> {
        if self.fail_play {
            return Err(PlaybackError::Playback("device busy".to_string()));
        }
        self.log.lock().push(format!("start {}", resource.location));
        let delay = self.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.finishers.started(&self.log, resource.location.clone()))
    }

    fn release(&self, resource: &PlayableResource) -> Result<(), PlaybackError> {
        self.log.lock().push(format!("release {}", resource.location));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockClipboard {
    pub fail_write: bool,
    pub fail_selection: bool,
    pub copied: Mutex<Vec<String>>,
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_write {
            return Err(ClipboardError::WriteFailed("permission denied".to_string()));
        }
        self.copied.lock().push(text.to_string());
        Ok(())
    }

    fn copy_via_selection(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_selection {
            return Err(ClipboardError::Unavailable);
        }
        self.copied.lock().push(format!("selection:{}", text));
        Ok(())
    }
}

pub struct Harness {
    pub widget: Orchestrator,
    pub ui: Arc<RecordingUi>,
    pub service: Arc<MockService>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub player: Arc<MockPlayer>,
    pub clipboard: Arc<MockClipboard>,
    pub log: EventLog,
}

pub struct HarnessBuilder {
    synthesizer_available: bool,
    player_fails: bool,
    clipboard: MockClipboard,
    settings: OrchestratorSettings,
}

impl HarnessBuilder {
    pub fn on_device_speech(mut self, available: bool) -> Self {
        self.synthesizer_available = available;
        self
    }

    pub fn player_fails(mut self) -> Self {
        self.player_fails = true;
        self
    }

    pub fn clipboard(mut self, clipboard: MockClipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Harness {
        let log: EventLog = Arc::default();
        let ui = Arc::new(RecordingUi::default());
        let service = Arc::new(MockService::default());
        let synthesizer = Arc::new(MockSynthesizer::new(self.synthesizer_available, log.clone()));
        let mut player = MockPlayer::new(log.clone());
        player.fail_play = self.player_fails;
        let player = Arc::new(player);
        let clipboard = Arc::new(self.clipboard);

        let widget = Orchestrator::new(
            Collaborators {
                ui: ui.clone(),
                service: service.clone(),
                synthesizer: synthesizer.clone(),
                player: player.clone(),
                clipboard: clipboard.clone(),
            },
            self.settings,
        );

        Harness {
            widget,
            ui,
            service,
            synthesizer,
            player,
            clipboard,
            log,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            synthesizer_available: true,
            player_fails: false,
            clipboard: MockClipboard::default(),
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

pub fn translation(text: &str, detected: Option<&str>) -> Translation {
    Translation {
        text: text.to_string(),
        detected_language: detected.map(str::to_string),
    }
}

/// Let spawned tasks (playback watchers, timers) run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
