pub mod interface;
pub mod client;

pub use interface::{
    SpeechRequest, SpeechResponse, Translation, TranslationRequest, TranslationService,
};
pub use client::{HttpTranslationClient, ServiceHealth};
