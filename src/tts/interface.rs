use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::PlaybackError;

/// How a playback ended on its own.
pub type PlaybackOutcome = Result<(), PlaybackError>;

/// A piece of text for on-device synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Full locale tag such as `fr-FR`.
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Handle that halts a playback which is still running.
pub trait PlaybackControl: Send {
    /// Stop output immediately. Must be safe to call after playback ended.
    fn stop(&mut self);
}

/// A playback that has started.
///
/// `finished` resolves with the natural outcome. If the producer drops the
/// sender (for example because the playback was stopped) the receiver
/// yields a `RecvError`, which callers treat as a stop.
pub struct StartedPlayback {
    pub control: Box<dyn PlaybackControl>,
    pub finished: oneshot::Receiver<PlaybackOutcome>,
}

impl StartedPlayback {
    pub fn new(
        control: Box<dyn PlaybackControl>,
        finished: oneshot::Receiver<PlaybackOutcome>,
    ) -> Self {
        Self { control, finished }
    }
}

impl std::fmt::Debug for StartedPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartedPlayback").finish_non_exhaustive()
    }
}

/// Speech synthesis available on this device.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Capability probe, evaluated on every speak request.
    fn is_available(&self) -> bool;

    /// Begin speaking. Returns once output has started.
    async fn speak(&self, utterance: Utterance) -> Result<StartedPlayback, PlaybackError>;
}

/// Decoded audio bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

/// Something a player can play, e.g. a cached file. Must be released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableResource {
    pub id: Uuid,
    pub location: String,
    pub mime_type: &'static str,
}

/// Plays encoded audio clips.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Wrap decoded audio into a playable resource.
    fn load(&self, clip: AudioClip) -> Result<PlayableResource, PlaybackError>;

    /// Start playing `resource`. Returns once output has started.
    async fn play(&self, resource: &PlayableResource) -> Result<StartedPlayback, PlaybackError>;

    /// Free the resource created by [`AudioPlayer::load`].
    fn release(&self, resource: &PlayableResource) -> Result<(), PlaybackError>;
}
