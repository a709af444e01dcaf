//! Error types surfaced by the widget.
//!
//! Every error is non-fatal: the orchestrator shows `user_message()` in the
//! error banner and the widget stays usable.

use thiserror::Error;

/// Local precondition failures. These never reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter text to translate")]
    EmptyText,

    #[error("Text exceeds the {max} character limit")]
    TooLong { max: usize },

    #[error("Source and target languages cannot be the same")]
    SameLanguage,

    #[error("Cannot swap when auto-detect is selected")]
    AutoDetectSwap,

    #[error("No text to copy")]
    NothingToCopy,

    #[error("No text to speak")]
    NothingToSpeak,
}

/// Server endpoint an outbound request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Translate,
    TextToSpeech,
    Health,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Translate => "/translate",
            Endpoint::TextToSpeech => "/text-to-speech",
            Endpoint::Health => "/test",
        }
    }

    /// Message shown when the server did not supply one.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Translate => "Translation failed",
            Endpoint::TextToSpeech => "Text-to-speech failed",
            Endpoint::Health => "Translation service is unreachable",
        }
    }
}

/// Failures talking to the translation server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Non-2xx response carrying a server-provided message.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Non-2xx response without a usable `error` field.
    #[error("{} (HTTP {status})", endpoint.fallback_message())]
    Status { endpoint: Endpoint, status: u16 },

    #[error("{} ({detail})", endpoint.fallback_message())]
    Transport { endpoint: Endpoint, detail: String },

    #[error("{} (invalid response: {detail})", endpoint.fallback_message())]
    InvalidResponse { endpoint: Endpoint, detail: String },
}

impl RequestError {
    /// Server message verbatim when present, else the endpoint's fallback.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Server { message, .. } => message.clone(),
            RequestError::Status { endpoint, .. }
            | RequestError::Transport { endpoint, .. }
            | RequestError::InvalidResponse { endpoint, .. } => {
                endpoint.fallback_message().to_string()
            }
        }
    }
}

/// Speech synthesis and audio playback failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Speech synthesis is not available")]
    Unavailable,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Audio playback failed: {0}")]
    Playback(String),
}

impl PlaybackError {
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::Unavailable => "Speech synthesis is not available".to_string(),
            PlaybackError::Synthesis(_) => "Speech synthesis failed".to_string(),
            PlaybackError::Decode(_) => "Failed to decode audio".to_string(),
            PlaybackError::Playback(_) => "Audio playback failed".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard is unavailable")]
    Unavailable,

    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Everything an orchestrator operation can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// A newer operation replaced this one before it settled.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl WidgetError {
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::Validation(e) => e.to_string(),
            WidgetError::Request(e) => e.user_message(),
            WidgetError::Playback(e) => e.user_message(),
            WidgetError::Clipboard(_) => "Failed to copy text".to_string(),
            WidgetError::Superseded => String::new(),
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, WidgetError::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = WidgetError::from(RequestError::Server {
            status: 400,
            message: "Language not supported".to_string(),
        });
        assert_eq!(err.user_message(), "Language not supported");
    }

    #[test]
    fn transport_failures_use_endpoint_fallback() {
        let err = RequestError::Transport {
            endpoint: Endpoint::TextToSpeech,
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.user_message(), "Text-to-speech failed");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn playback_errors_hide_internal_detail() {
        let err = WidgetError::from(PlaybackError::Synthesis("voice missing".into()));
        assert_eq!(err.user_message(), "Speech synthesis failed");
    }
}
