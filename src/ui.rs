//! The display surface the orchestrator drives.
//!
//! The orchestrator never reads from the surface; user input arrives through
//! orchestrator calls and everything shown is pushed through this trait.

/// Controls that can be enabled or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Submit,
    Copy,
    Speak,
}

/// Elements that are shown or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Loading,
    ErrorBanner,
    StatusBanner,
    DetectedLanguageBanner,
    /// Speak control shows its busy state instead of the idle icon.
    SpeakBusy,
    /// Transient acknowledgement on the copy control.
    CopyAcknowledged,
}

/// Text-bearing elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Input,
    Output,
    CharCounter,
    ErrorMessage,
    StatusMessage,
    DetectedLanguage,
    SourceLanguage,
    TargetLanguage,
}

pub trait UiSurface: Send + Sync {
    fn set_enabled(&self, control: Control, enabled: bool);

    fn set_visible(&self, indicator: Indicator, visible: bool);

    fn set_text(&self, field: TextField, text: &str);
}

/// Counter label, e.g. `12/5000`.
pub fn char_counter(text: &str, max_chars: usize) -> String {
    format!("{}/{}", text.chars().count(), max_chars)
}

/// Banner text for a detected source language.
pub fn detected_language_label(language: &str) -> String {
    format!("Detected language: {}", language)
}
