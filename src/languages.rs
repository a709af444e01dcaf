use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire code for server-side language detection.
pub const AUTO_CODE: &str = "auto";

/// Locale used when a code has no entry in the voice table.
pub const DEFAULT_VOICE_LOCALE: &str = "en-US";

/// Languages the translation service supports as a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Fr,
    Es,
    De,
    Zh,
    Ja,
    Ko,
    Ar,
    Pt,
    Ru,
    It,
    Nl,
    Tr,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::En,
        Language::Hi,
        Language::Fr,
        Language::Es,
        Language::De,
        Language::Zh,
        Language::Ja,
        Language::Ko,
        Language::Ar,
        Language::Pt,
        Language::Ru,
        Language::It,
        Language::Nl,
        Language::Tr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::De => "de",
            Language::Zh => "zh",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Ar => "ar",
            Language::Pt => "pt",
            Language::Ru => "ru",
            Language::It => "it",
            Language::Nl => "nl",
            Language::Tr => "tr",
        }
    }

    /// Human-readable name, as the server reports detected languages.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::De => "German",
            Language::Zh => "Chinese",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Ar => "Arabic",
            Language::Pt => "Portuguese",
            Language::Ru => "Russian",
            Language::It => "Italian",
            Language::Nl => "Dutch",
            Language::Tr => "Turkish",
        }
    }

    /// Full locale tag handed to speech synthesis.
    pub fn voice_locale(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Hi => "hi-IN",
            Language::Fr => "fr-FR",
            Language::Es => "es-ES",
            Language::De => "de-DE",
            Language::Zh => "zh-CN",
            Language::Ja => "ja-JP",
            Language::Ko => "ko-KR",
            Language::Ar => "ar-SA",
            Language::Pt => "pt-BR",
            Language::Ru => "ru-RU",
            Language::It => "it-IT",
            Language::Nl => "nl-NL",
            Language::Tr => "tr-TR",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Source side of a language pair: a fixed language or server detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Auto,
    Fixed(Language),
}

impl SourceLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            SourceLanguage::Auto => AUTO_CODE,
            SourceLanguage::Fixed(lang) => lang.code(),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, SourceLanguage::Auto)
    }

    pub fn fixed(&self) -> Option<Language> {
        match self {
            SourceLanguage::Auto => None,
            SourceLanguage::Fixed(lang) => Some(*lang),
        }
    }
}

impl From<Language> for SourceLanguage {
    fn from(lang: Language) -> Self {
        SourceLanguage::Fixed(lang)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SourceLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(AUTO_CODE) {
            return Ok(SourceLanguage::Auto);
        }
        s.parse().map(SourceLanguage::Fixed)
    }
}

/// Map a short code (possibly normalized by the server) to a voice locale.
///
/// Exact lookup: codes are matched as sent, so `"FR"` gets the default.
pub fn voice_locale(code: &str) -> &'static str {
    Language::ALL
        .iter()
        .find(|lang| lang.code() == code)
        .map(|lang| lang.voice_locale())
        .unwrap_or(DEFAULT_VOICE_LOCALE)
}
