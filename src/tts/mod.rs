pub mod interface;
pub mod backend;

pub use interface::{
    AudioClip, AudioPlayer, PlayableResource, PlaybackControl, PlaybackOutcome, SpeechSynthesizer,
    StartedPlayback, Utterance,
};
pub use backend::{SpeechBackend, StartedSpeech, VoiceSettings};
