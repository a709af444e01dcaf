use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::interface::{AudioClip, AudioPlayer, SpeechSynthesizer, StartedPlayback, Utterance};
use crate::error::{PlaybackError, WidgetError};
use crate::languages::voice_locale;
use crate::playback::ResourceLease;
use crate::translate::{SpeechRequest, SpeechResponse, TranslationService};

/// MIME type of audio the server returns inline.
pub const SERVER_AUDIO_MIME: &str = "audio/mp3";

/// Voice parameters for on-device synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
}

fn default_rate() -> f32 {
    0.8
}

fn default_pitch() -> f32 {
    1.0
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            pitch: default_pitch(),
        }
    }
}

impl VoiceSettings {
    pub fn utterance(&self, text: impl Into<String>, lang: &str) -> Utterance {
        Utterance {
            text: text.into(),
            locale: voice_locale(lang).to_string(),
            rate: self.rate,
            pitch: self.pitch,
        }
    }
}

/// A started speech playback plus the resource it holds, if any.
pub struct StartedSpeech {
    pub playback: StartedPlayback,
    pub resource: Option<ResourceLease>,
}

/// Where speech comes from, chosen per request by probing the device.
#[derive(Clone)]
pub enum SpeechBackend {
    OnDevice(Arc<dyn SpeechSynthesizer>),
    ServerRelayed {
        service: Arc<dyn TranslationService>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
    },
}

impl SpeechBackend {
    pub fn select(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        service: Arc<dyn TranslationService>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        if synthesizer.is_available() {
            SpeechBackend::OnDevice(synthesizer)
        } else {
            debug!("On-device synthesis unavailable, relaying speech through the server");
            SpeechBackend::ServerRelayed {
                service,
                synthesizer,
                player,
            }
        }
    }

    pub fn is_on_device(&self) -> bool {
        matches!(self, SpeechBackend::OnDevice(_))
    }

    /// Start speaking `text` in `lang` (a short code).
    pub async fn start(
        &self,
        text: &str,
        lang: &str,
        voice: &VoiceSettings,
    ) -> Result<StartedSpeech, WidgetError> {
        match self {
            SpeechBackend::OnDevice(synthesizer) => {
                let playback = synthesizer.speak(voice.utterance(text, lang)).await?;
                Ok(StartedSpeech {
                    playback,
                    resource: None,
                })
            }
            SpeechBackend::ServerRelayed {
                service,
                synthesizer,
                player,
            } => {
                let request = SpeechRequest {
                    text: text.to_string(),
                    lang: lang.to_string(),
                };
                match service.synthesize_speech(&request).await? {
                    SpeechResponse::UseOnDevice { text, lang } => {
                        info!("Server requested on-device synthesis for lang={}", lang);
                        let playback = synthesizer.speak(voice.utterance(text, &lang)).await?;
                        Ok(StartedSpeech {
                            playback,
                            resource: None,
                        })
                    }
                    SpeechResponse::Audio { audio_data } => {
                        let clip = decode_audio(&audio_data)?;
                        debug!("Decoded {} bytes of server audio", clip.data.len());
                        let resource = player.load(clip)?;
                        let lease = ResourceLease::new(player.clone(), resource);
                        // Dropping the lease on error releases the resource.
                        let playback = player.play(lease.resource()).await?;
                        Ok(StartedSpeech {
                            playback,
                            resource: Some(lease),
                        })
                    }
                }
            }
        }
    }
}

/// Decode the base64 payload of a `/text-to-speech` response.
pub fn decode_audio(audio_data: &str) -> Result<AudioClip, PlaybackError> {
    let data = STANDARD
        .decode(audio_data.trim())
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
    if data.is_empty() {
        return Err(PlaybackError::Decode("empty audio payload".to_string()));
    }
    Ok(AudioClip {
        data,
        mime_type: SERVER_AUDIO_MIME,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_uses_locale_table() {
        let voice = VoiceSettings::default();
        let utterance = voice.utterance("Bonjour", "fr");
        assert_eq!(utterance.locale, "fr-FR");
        assert_eq!(utterance.rate, 0.8);
        assert_eq!(utterance.pitch, 1.0);

        assert_eq!(voice.utterance("?", "xx").locale, "en-US");
    }

    #[test]
    fn decodes_inline_audio() {
        let clip = decode_audio("SUQzBAA=").unwrap();
        assert_eq!(clip.data, vec![0x49, 0x44, 0x33, 0x04, 0x00]);
        assert_eq!(clip.mime_type, "audio/mp3");
    }

    #[test]
    fn rejects_malformed_audio() {
        assert!(matches!(decode_audio("not base64!!"), Err(PlaybackError::Decode(_))));
        assert!(matches!(decode_audio(""), Err(PlaybackError::Decode(_))));
    }
}
