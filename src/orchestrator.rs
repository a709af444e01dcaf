//! Request orchestrator: owns the widget state, drives the UI surface and
//! sequences translation, speech and clipboard work.
//!
//! Per submission: `Idle -> Validating -> Invalid -> Idle` (error shown) or
//! `Requesting -> Success | Failure -> Idle`. At most one translation is in
//! flight; a newer submission, a language change, a swap or a reset aborts it
//! and the aborted submission never touches the UI again.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{Endpoint, RequestError, ValidationError, WidgetError};
use crate::languages::{Language, SourceLanguage};
use crate::playback::PlaybackSlot;
use crate::state::{InFlight, WidgetState};
use crate::translate::interface::MAX_CHARS;
use crate::translate::{Translation, TranslationRequest, TranslationService};
use crate::tts::{
    AudioPlayer, PlaybackOutcome, SpeechBackend, SpeechSynthesizer, StartedSpeech, VoiceSettings,
};
use crate::ui::{char_counter, detected_language_label, Control, Indicator, TextField, UiSurface};

/// Status shown when the selection fallback copied the text.
pub const COPIED_VIA_SELECTION: &str = "Text copied to clipboard";

/// External collaborators injected into the orchestrator.
#[derive(Clone)]
pub struct Collaborators {
    pub ui: Arc<dyn UiSurface>,
    pub service: Arc<dyn TranslationService>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub player: Arc<dyn AudioPlayer>,
    pub clipboard: Arc<dyn Clipboard>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_chars: usize,
    pub error_dismiss: Duration,
    pub copy_ack: Duration,
    pub voice: VoiceSettings,
    pub source: SourceLanguage,
    pub target: Language,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_chars: MAX_CHARS,
            error_dismiss: Duration::from_secs(5),
            copy_ack: Duration::from_millis(1500),
            voice: VoiceSettings::default(),
            source: SourceLanguage::Auto,
            target: Language::Es,
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            max_chars: config.widget.max_chars,
            error_dismiss: config.widget.error_dismiss(),
            copy_ack: config.widget.copy_ack(),
            voice: config.speech.voice,
            source: config.widget.source_lang()?,
            target: config.widget.target_lang()?,
        })
    }
}

/// How `copy` got the text onto the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Clipboard,
    Selection,
}

/// Read-only view of the widget model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSnapshot {
    pub input: String,
    pub output: String,
    pub source: SourceLanguage,
    pub target: Language,
    pub detected_language: Option<String>,
    pub requesting: bool,
    pub playing: bool,
}

struct Shared {
    collaborators: Collaborators,
    settings: OrchestratorSettings,
    state: Mutex<WidgetState>,
    playback: Mutex<PlaybackSlot>,
}

/// Cheap to clone; all clones drive the same widget.
///
/// `UiSurface` implementations must not call back into the orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, settings: OrchestratorSettings) -> Self {
        let state = WidgetState::new(settings.source, settings.target);
        let orchestrator = Self {
            shared: Arc::new(Shared {
                collaborators,
                settings,
                state: Mutex::new(state),
                playback: Mutex::new(PlaybackSlot::new()),
            }),
        };
        orchestrator.render_initial();
        orchestrator
    }

    fn ui(&self) -> &dyn UiSurface {
        self.shared.collaborators.ui.as_ref()
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let state = self.shared.state.lock();
        WidgetSnapshot {
            input: state.input.clone(),
            output: state.output.clone(),
            source: state.source,
            target: state.target,
            detected_language: state.detected_language.clone(),
            requesting: state.is_requesting(),
            playing: self.shared.playback.lock().is_active(),
        }
    }

    fn render_initial(&self) {
        let state = self.shared.state.lock();
        let ui = self.ui();
        ui.set_text(TextField::SourceLanguage, state.source.code());
        ui.set_text(TextField::TargetLanguage, state.target.code());
        ui.set_text(TextField::Input, "");
        ui.set_text(TextField::Output, "");
        ui.set_text(
            TextField::CharCounter,
            &char_counter("", self.shared.settings.max_chars),
        );
        for control in [Control::Submit, Control::Copy, Control::Speak] {
            ui.set_enabled(control, false);
        }
        for indicator in [
            Indicator::Loading,
            Indicator::ErrorBanner,
            Indicator::StatusBanner,
            Indicator::DetectedLanguageBanner,
            Indicator::SpeakBusy,
            Indicator::CopyAcknowledged,
        ] {
            ui.set_visible(indicator, false);
        }
    }

    /// Live input edit.
    pub fn on_input_changed(&self, text: &str) {
        let mut state = self.shared.state.lock();
        state.input = text.to_string();

        let ui = self.ui();
        ui.set_text(
            TextField::CharCounter,
            &char_counter(text, self.shared.settings.max_chars),
        );
        ui.set_enabled(Control::Submit, state.can_submit());

        if !state.has_input() {
            self.cancel_request(&mut state);
            self.clear_output(&mut state);
        }
    }

    /// Source or target selection changed.
    pub fn on_language_selection_changed(&self, source: SourceLanguage, target: Language) {
        let mut state = self.shared.state.lock();
        if state.source == source && state.target == target {
            return;
        }
        debug!("Language pair changed to {} -> {}", source, target);
        state.source = source;
        state.target = target;

        let ui = self.ui();
        ui.set_text(TextField::SourceLanguage, source.code());
        ui.set_text(TextField::TargetLanguage, target.code());

        if state.has_input() {
            // A result for the old pair must never land in the output.
            self.cancel_request(&mut state);
            self.clear_output(&mut state);
        }
    }

    /// Translate the current input with the current language pair.
    pub async fn submit_translation(&self) -> Result<Translation, WidgetError> {
        let (task, generation) = {
            let mut state = self.shared.state.lock();
            let request = match TranslationRequest::with_limit(
                &state.input,
                state.source,
                state.target,
                self.shared.settings.max_chars,
            ) {
                Ok(request) => request,
                Err(e) => {
                    debug!("Submission rejected: {}", e);
                    let err = WidgetError::from(e);
                    self.show_error(&mut state, &err.user_message());
                    return Err(err);
                }
            };

            if state.cancel_in_flight() {
                debug!("Superseding in-flight translation");
            }
            let generation = state.next_generation();
            let service = Arc::clone(&self.shared.collaborators.service);
            let task = tokio::spawn(async move { service.translate(&request).await });
            state.in_flight = Some(InFlight {
                generation,
                abort: task.abort_handle(),
            });

            let ui = self.ui();
            ui.set_visible(Indicator::Loading, true);
            ui.set_enabled(Control::Submit, false);
            self.hide_banner(&mut state, Indicator::ErrorBanner);
            ui.set_visible(Indicator::DetectedLanguageBanner, false);
            debug!("Translation {} requested", generation);
            (task, generation)
        };

        // Restores loading/submit on every exit path, including drop.
        let _guard = RequestGuard {
            orchestrator: self,
            generation,
        };

        let outcome = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                debug!("Translation {} aborted", generation);
                return Err(WidgetError::Superseded);
            }
            Err(e) => Err(RequestError::Transport {
                endpoint: Endpoint::Translate,
                detail: e.to_string(),
            }),
        };

        let mut state = self.shared.state.lock();
        if !state.is_current(generation) {
            debug!("Ignoring late result of translation {}", generation);
            return Err(WidgetError::Superseded);
        }

        match outcome {
            Ok(translation) => {
                let ui = self.ui();
                state.output = translation.text.clone();
                ui.set_text(TextField::Output, &state.output);

                state.detected_language = None;
                if state.source.is_auto() {
                    if let Some(language) = &translation.detected_language {
                        state.detected_language = Some(language.clone());
                        ui.set_text(TextField::DetectedLanguage, &detected_language_label(language));
                        ui.set_visible(Indicator::DetectedLanguageBanner, true);
                    }
                }

                let has_output = state.has_output();
                ui.set_enabled(Control::Copy, has_output);
                ui.set_enabled(Control::Speak, has_output);
                info!("Translation {} completed", generation);
                Ok(translation)
            }
            Err(e) => {
                warn!("Translation {} failed: {}", generation, e);
                let err = WidgetError::from(e);
                self.show_error(&mut state, &err.user_message());
                self.clear_output(&mut state);
                Err(err)
            }
        }
    }

    /// Speak the current output in the target language.
    pub async fn speak(&self) -> Result<(), WidgetError> {
        let (text, lang) = {
            let mut state = self.shared.state.lock();
            let text = state.output.trim().to_string();
            if text.is_empty() {
                let err = WidgetError::from(ValidationError::NothingToSpeak);
                self.show_error(&mut state, &err.user_message());
                return Err(err);
            }
            (text, state.target.code())
        };

        let ticket = self.shared.playback.lock().reserve();
        self.ui().set_visible(Indicator::SpeakBusy, true);
        self.ui().set_enabled(Control::Speak, false);

        let collaborators = &self.shared.collaborators;
        let backend = SpeechBackend::select(
            Arc::clone(&collaborators.synthesizer),
            Arc::clone(&collaborators.service),
            Arc::clone(&collaborators.player),
        );
        debug!(
            "Speaking {} chars via {} backend",
            text.chars().count(),
            if backend.is_on_device() { "on-device" } else { "server" }
        );

        let outcome = match backend.start(&text, lang, &self.shared.settings.voice).await {
            Ok(StartedSpeech { playback, resource }) => {
                let activated = self
                    .shared
                    .playback
                    .lock()
                    .activate(ticket, playback.control, resource);
                match activated {
                    Some(id) => {
                        self.watch_playback(id, playback.finished);
                        Ok(())
                    }
                    None => Err(WidgetError::Superseded),
                }
            }
            Err(e) => Err(e),
        };

        if outcome.as_ref().err().is_some_and(|e| e.is_superseded()) {
            debug!("Speech start superseded");
            return outcome;
        }
        // A newer speak, stop or reset owns the speak control now.
        if !self.shared.playback.lock().is_current(ticket) {
            if let Err(e) = &outcome {
                debug!("Ignoring failure of superseded speech: {}", e);
            }
            return outcome;
        }

        let mut state = self.shared.state.lock();
        self.render_speak_idle(&state);
        if let Err(e) = &outcome {
            warn!("Speech failed: {}", e);
            self.show_error(&mut state, &e.user_message());
        }
        outcome
    }

    fn watch_playback(&self, id: u64, finished: tokio::sync::oneshot::Receiver<PlaybackOutcome>) {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            // A dropped sender means the playback was stopped.
            let outcome = finished.await.unwrap_or(Ok(()));
            if !orchestrator.shared.playback.lock().finish(id) {
                return;
            }
            let mut state = orchestrator.shared.state.lock();
            orchestrator.render_speak_idle(&state);
            if let Err(e) = outcome {
                warn!("Playback {} failed: {}", id, e);
                let message = WidgetError::from(e).user_message();
                orchestrator.show_error(&mut state, &message);
            }
        });
    }

    /// Copy the current output to the clipboard.
    pub async fn copy(&self) -> Result<CopyMethod, WidgetError> {
        let text = {
            let mut state = self.shared.state.lock();
            let text = state.output.trim().to_string();
            if text.is_empty() {
                let err = WidgetError::from(ValidationError::NothingToCopy);
                self.show_error(&mut state, &err.user_message());
                return Err(err);
            }
            text
        };

        let clipboard = Arc::clone(&self.shared.collaborators.clipboard);
        let result = match clipboard.write_text(&text).await {
            Ok(()) => Ok(CopyMethod::Clipboard),
            Err(e) => {
                warn!("Clipboard write failed, falling back to selection: {}", e);
                clipboard
                    .copy_via_selection(&text)
                    .map(|()| CopyMethod::Selection)
            }
        };

        let mut state = self.shared.state.lock();
        match result {
            Ok(CopyMethod::Clipboard) => {
                let token = state.arm_timer(Indicator::CopyAcknowledged);
                self.ui().set_visible(Indicator::CopyAcknowledged, true);
                self.schedule_hide(
                    Indicator::CopyAcknowledged,
                    token,
                    self.shared.settings.copy_ack,
                );
                Ok(CopyMethod::Clipboard)
            }
            Ok(CopyMethod::Selection) => {
                self.show_banner(
                    &mut state,
                    Indicator::StatusBanner,
                    TextField::StatusMessage,
                    COPIED_VIA_SELECTION,
                );
                Ok(CopyMethod::Selection)
            }
            Err(e) => {
                warn!("Copy failed: {}", e);
                let err = WidgetError::from(e);
                self.show_error(&mut state, &err.user_message());
                Err(err)
            }
        }
    }

    /// Exchange languages and texts.
    pub fn swap(&self) -> Result<(), WidgetError> {
        let mut state = self.shared.state.lock();
        let Some(source) = state.source.fixed() else {
            let err = WidgetError::from(ValidationError::AutoDetectSwap);
            self.show_error(&mut state, &err.user_message());
            return Err(err);
        };

        self.cancel_request(&mut state);

        let new_input = state.output.trim().to_string();
        let new_output = state.input.trim().to_string();
        state.source = SourceLanguage::Fixed(state.target);
        state.target = source;
        state.input = new_input;
        state.output = new_output;
        state.detected_language = None;
        debug!("Swapped to {} -> {}", state.source, state.target);

        let ui = self.ui();
        ui.set_text(TextField::SourceLanguage, state.source.code());
        ui.set_text(TextField::TargetLanguage, state.target.code());
        ui.set_text(TextField::Input, &state.input);
        ui.set_text(TextField::Output, &state.output);
        ui.set_text(
            TextField::CharCounter,
            &char_counter(&state.input, self.shared.settings.max_chars),
        );
        ui.set_enabled(Control::Submit, state.can_submit());
        let has_output = state.has_output();
        ui.set_enabled(Control::Copy, has_output);
        ui.set_enabled(Control::Speak, has_output);
        self.hide_banner(&mut state, Indicator::ErrorBanner);
        ui.set_visible(Indicator::DetectedLanguageBanner, false);
        Ok(())
    }

    /// Clear everything and stop any playback.
    pub fn reset(&self) {
        {
            let mut state = self.shared.state.lock();
            self.cancel_request(&mut state);
            state.input.clear();
            state.output.clear();
            state.detected_language = None;

            let ui = self.ui();
            ui.set_text(TextField::Input, "");
            ui.set_text(TextField::Output, "");
            ui.set_text(
                TextField::CharCounter,
                &char_counter("", self.shared.settings.max_chars),
            );
            for control in [Control::Submit, Control::Copy, Control::Speak] {
                ui.set_enabled(control, false);
            }
            self.hide_banner(&mut state, Indicator::ErrorBanner);
            self.hide_banner(&mut state, Indicator::StatusBanner);
            ui.set_visible(Indicator::DetectedLanguageBanner, false);
        }

        if self.shared.playback.lock().stop() {
            debug!("Stopped active playback on reset");
        }
        self.ui().set_visible(Indicator::SpeakBusy, false);
    }

    /// Stop any active playback without touching the texts.
    pub fn stop_playback(&self) -> bool {
        let stopped = self.shared.playback.lock().stop();
        let state = self.shared.state.lock();
        self.render_speak_idle(&state);
        stopped
    }

    fn clear_output(&self, state: &mut WidgetState) {
        state.output.clear();
        state.detected_language = None;
        let ui = self.ui();
        ui.set_text(TextField::Output, "");
        ui.set_enabled(Control::Copy, false);
        ui.set_enabled(Control::Speak, false);
        ui.set_visible(Indicator::DetectedLanguageBanner, false);
    }

    fn cancel_request(&self, state: &mut WidgetState) {
        if state.cancel_in_flight() {
            debug!("Aborted in-flight translation");
            self.ui().set_visible(Indicator::Loading, false);
        }
        self.ui().set_enabled(Control::Submit, state.can_submit());
    }

    fn render_speak_idle(&self, state: &WidgetState) {
        self.ui().set_visible(Indicator::SpeakBusy, false);
        self.ui().set_enabled(Control::Speak, state.has_output());
    }

    fn show_error(&self, state: &mut WidgetState, message: &str) {
        self.show_banner(state, Indicator::ErrorBanner, TextField::ErrorMessage, message);
    }

    fn show_banner(
        &self,
        state: &mut WidgetState,
        indicator: Indicator,
        field: TextField,
        message: &str,
    ) {
        let token = state.arm_timer(indicator);
        self.ui().set_text(field, message);
        self.ui().set_visible(indicator, true);
        self.schedule_hide(indicator, token, self.shared.settings.error_dismiss);
    }

    fn hide_banner(&self, state: &mut WidgetState, indicator: Indicator) {
        state.arm_timer(indicator);
        self.ui().set_visible(indicator, false);
    }

    /// Hide `indicator` after `delay` unless it was re-armed meanwhile.
    fn schedule_hide(&self, indicator: Indicator, token: u64, delay: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime, {:?} stays visible", indicator);
            return;
        };
        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let state = shared.state.lock();
            if state.is_timer_current(indicator, token) {
                shared.collaborators.ui.set_visible(indicator, false);
            }
        });
    }
}

/// Finally-style cleanup for one submission.
struct RequestGuard<'a> {
    orchestrator: &'a Orchestrator,
    generation: u64,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.orchestrator.shared.state.lock();
        if !state.is_current(self.generation) {
            // A newer submission or a cancel owns the controls now.
            return;
        }
        state.cancel_in_flight();
        let ui = self.orchestrator.ui();
        ui.set_visible(Indicator::Loading, false);
        ui.set_enabled(Control::Submit, state.can_submit());
    }
}
