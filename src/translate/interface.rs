use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Endpoint, RequestError, ValidationError};
use crate::languages::{Language, SourceLanguage};

/// Maximum number of characters accepted for one translation.
pub const MAX_CHARS: usize = 5000;

/// A validated translation job. Only constructible through [`TranslationRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    source_text: String,
    source_lang: SourceLanguage,
    target_lang: Language,
}

impl TranslationRequest {
    /// Trims `text` and checks the local preconditions of a submission.
    pub fn new(
        text: &str,
        source_lang: SourceLanguage,
        target_lang: Language,
    ) -> Result<Self, ValidationError> {
        Self::with_limit(text, source_lang, target_lang, MAX_CHARS)
    }

    pub fn with_limit(
        text: &str,
        source_lang: SourceLanguage,
        target_lang: Language,
        max_chars: usize,
    ) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if trimmed.chars().count() > max_chars {
            return Err(ValidationError::TooLong { max: max_chars });
        }
        if source_lang == SourceLanguage::Fixed(target_lang) {
            return Err(ValidationError::SameLanguage);
        }

        Ok(Self {
            source_text: trimmed.to_string(),
            source_lang,
            target_lang,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn source_lang(&self) -> SourceLanguage {
        self.source_lang
    }

    pub fn target_lang(&self) -> Language {
        self.target_lang
    }

    /// JSON body for `POST /translate`.
    pub fn to_body(&self) -> TranslateBody<'_> {
        TranslateBody {
            text: &self.source_text,
            source_lang: self.source_lang.code(),
            target_lang: self.target_lang.code(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslateBody<'a> {
    pub text: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    #[serde(default)]
    pub detected_language: Option<String>,
}

/// Error body the server sends with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a successful translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Human-readable label, e.g. "English".
    pub detected_language: Option<String>,
}

impl From<TranslateResponse> for Translation {
    fn from(response: TranslateResponse) -> Self {
        Self {
            text: response.translated_text,
            detected_language: response.detected_language.filter(|l| !l.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub lang: String,
}

/// What the server wants the client to do for speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechResponse {
    /// Synthesize on-device with server-normalized text and language.
    UseOnDevice { text: String, lang: String },
    /// Base64 encoded mp3 audio.
    Audio { audio_data: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSpeechResponse {
    #[serde(default)]
    use_browser_tts: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    audio_data: Option<String>,
}

impl RawSpeechResponse {
    pub(crate) fn into_response(
        self,
        request: &SpeechRequest,
    ) -> Result<SpeechResponse, RequestError> {
        if self.use_browser_tts {
            return Ok(SpeechResponse::UseOnDevice {
                text: self.text.unwrap_or_else(|| request.text.clone()),
                lang: self.lang.unwrap_or_else(|| request.lang.clone()),
            });
        }
        match self.audio_data {
            Some(audio_data) if !audio_data.is_empty() => Ok(SpeechResponse::Audio { audio_data }),
            _ => Err(RequestError::InvalidResponse {
                endpoint: Endpoint::TextToSpeech,
                detail: "neither audio_data nor use_browser_tts present".to_string(),
            }),
        }
    }
}

/// Translation backend. The HTTP implementation is [`super::HttpTranslationClient`].
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// `POST /translate`
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, RequestError>;

    /// `POST /text-to-speech`
    async fn synthesize_speech(&self, request: &SpeechRequest)
        -> Result<SpeechResponse, RequestError>;
}
