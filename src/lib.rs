//! Client-side translation widget: validates input, calls the translation
//! server, shows results and plays speech, with the display abstracted
//! behind [`ui::UiSurface`].

pub mod clipboard;
pub mod config;
pub mod console;
pub mod error;
pub mod languages;
pub mod orchestrator;
pub mod playback;
pub mod state;
pub mod translate;
pub mod tts;
pub mod ui;

pub use error::WidgetError;
pub use languages::{Language, SourceLanguage};
pub use orchestrator::{Collaborators, CopyMethod, Orchestrator, OrchestratorSettings};
