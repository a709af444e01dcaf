use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::ui::{Control, Indicator, TextField, UiSurface};

/// Prints what a user would see; everything else goes to the debug log.
#[derive(Default)]
pub struct ConsoleUi {
    texts: Mutex<HashMap<TextField, String>>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn text(&self, field: TextField) -> String {
        self.texts.lock().get(&field).cloned().unwrap_or_default()
    }

    /// Prompt showing the language pair and the character counter.
    pub fn prompt(&self) -> String {
        format!(
            "[{} -> {} | {}] > ",
            self.text(TextField::SourceLanguage),
            self.text(TextField::TargetLanguage),
            self.text(TextField::CharCounter),
        )
    }
}

impl UiSurface for ConsoleUi {
    fn set_enabled(&self, control: Control, enabled: bool) {
        debug!("{:?} enabled={}", control, enabled);
    }

    fn set_visible(&self, indicator: Indicator, visible: bool) {
        debug!("{:?} visible={}", indicator, visible);
        if !visible {
            return;
        }
        match indicator {
            Indicator::Loading => println!("translating..."),
            Indicator::ErrorBanner => println!("error: {}", self.text(TextField::ErrorMessage)),
            Indicator::StatusBanner => println!("{}", self.text(TextField::StatusMessage)),
            Indicator::DetectedLanguageBanner => {
                println!("{}", self.text(TextField::DetectedLanguage))
            }
            Indicator::CopyAcknowledged => println!("copied"),
            Indicator::SpeakBusy => println!("speaking..."),
        }
    }

    fn set_text(&self, field: TextField, text: &str) {
        if field == TextField::Output && !text.is_empty() {
            println!("=> {}", text);
        }
        self.texts.lock().insert(field, text.to_string());
    }
}
