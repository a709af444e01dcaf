use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clipboard::Clipboard;
use crate::error::{ClipboardError, PlaybackError};
use crate::tts::{
    AudioClip, AudioPlayer, PlayableResource, PlaybackControl, SpeechSynthesizer, StartedPlayback,
    Utterance,
};

/// Stops a playback process by signalling its supervisor task.
struct ProcessControl {
    kill: Option<oneshot::Sender<()>>,
}

impl PlaybackControl for ProcessControl {
    fn stop(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

/// Spawn `argv` and supervise it as a playback.
///
/// The playback finishes when the process exits. Stopping (or dropping the
/// control) kills the process and drops the completion sender.
fn spawn_playback(
    argv: &[String],
    error: fn(String) -> PlaybackError,
) -> Result<StartedPlayback, PlaybackError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| error("empty command".to_string()))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| error(format!("failed to start {}: {}", program, e)))?;

    let (kill_tx, kill_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = oneshot::channel();
    let program = program.clone();

    tokio::spawn(async move {
        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = kill_rx => None,
        };

        match exited {
            Some(status) => {
                let outcome = match status {
                    Ok(status) if status.success() => Ok(()),
                    Ok(status) => Err(error(format!("{} exited with {}", program, status))),
                    Err(e) => Err(error(e.to_string())),
                };
                let _ = done_tx.send(outcome);
            }
            None => {
                debug!("Killing {}", program);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", program, e);
                }
            }
        }
    });

    Ok(StartedPlayback::new(
        Box::new(ProcessControl {
            kill: Some(kill_tx),
        }),
        done_rx,
    ))
}

/// On-device synthesis through a local command such as `espeak-ng`.
///
/// Arguments may contain `{locale}`, `{rate}`, `{pitch}` and `{text}`; the
/// text is appended when no argument mentions it.
pub struct CommandSynthesizer {
    command: Option<Vec<String>>,
}

impl CommandSynthesizer {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
        }
    }

    pub fn argv(&self, utterance: &Utterance) -> Option<Vec<String>> {
        let command = self.command.as_ref()?;
        let mut mentions_text = false;
        let mut argv: Vec<String> = command
            .iter()
            .map(|arg| {
                mentions_text |= arg.contains("{text}");
                arg.replace("{locale}", &utterance.locale)
                    .replace("{rate}", &utterance.rate.to_string())
                    .replace("{pitch}", &utterance.pitch.to_string())
                    .replace("{text}", &utterance.text)
            })
            .collect();
        if !mentions_text {
            argv.push(utterance.text.clone());
        }
        Some(argv)
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn is_available(&self) -> bool {
        self.command.is_some()
    }

    async fn speak(&self, utterance: Utterance) -> Result<StartedPlayback, PlaybackError> {
        let argv = self.argv(&utterance).ok_or(PlaybackError::Unavailable)?;
        debug!("Synthesizing with locale {}", utterance.locale);
        spawn_playback(&argv, PlaybackError::Synthesis)
    }
}

/// Plays server audio from files in a cache directory.
pub struct CommandPlayer {
    command: Option<Vec<String>>,
    cache_dir: PathBuf,
}

impl CommandPlayer {
    pub fn new(command: Option<Vec<String>>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
            cache_dir: cache_dir.into(),
        }
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mp3" | "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    fn load(&self, clip: AudioClip) -> Result<PlayableResource, PlaybackError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| PlaybackError::Playback(format!("cache dir: {}", e)))?;

        let id = Uuid::new_v4();
        let path = self
            .cache_dir
            .join(format!("{}.{}", id, extension_for(clip.mime_type)));
        fs::write(&path, &clip.data)
            .map_err(|e| PlaybackError::Playback(format!("write {}: {}", path.display(), e)))?;
        debug!("Cached {} bytes of audio at {}", clip.data.len(), path.display());

        Ok(PlayableResource {
            id,
            location: path.to_string_lossy().into_owned(),
            mime_type: clip.mime_type,
        })
    }

    async fn play(&self, resource: &PlayableResource) -> Result<StartedPlayback, PlaybackError> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| PlaybackError::Playback("no player command configured".to_string()))?;
        let mut argv = command.clone();
        argv.push(resource.location.clone());
        spawn_playback(&argv, PlaybackError::Playback)
    }

    fn release(&self, resource: &PlayableResource) -> Result<(), PlaybackError> {
        let path = Path::new(&resource.location);
        if path.exists() {
            fs::remove_file(path).map_err(|e| PlaybackError::Playback(e.to_string()))?;
            debug!("Removed audio file: {}", resource.location);
        } else {
            debug!("Audio file does not exist: {}", resource.location);
        }
        Ok(())
    }
}

/// Clipboard backed by a command reading stdin (`wl-copy`, `xclip`, `pbcopy`).
pub struct CommandClipboard {
    command: Option<Vec<String>>,
}

impl CommandClipboard {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
        }
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args) = self
            .command
            .as_ref()
            .and_then(|c| c.split_first())
            .ok_or(ClipboardError::Unavailable)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::WriteFailed(format!("{}: {}", program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;
        if !status.success() {
            return Err(ClipboardError::WriteFailed(format!(
                "{} exited with {}",
                program, status
            )));
        }
        Ok(())
    }

    /// Print the text framed so it can be selected in the terminal.
    fn copy_via_selection(&self, text: &str) -> Result<(), ClipboardError> {
        println!("---- select to copy ----");
        println!("{}", text);
        println!("------------------------");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            locale: "fr-FR".to_string(),
            rate: 0.8,
            pitch: 1.0,
        }
    }

    #[test]
    fn synthesizer_expands_placeholders() {
        let synth = CommandSynthesizer::new(Some(vec![
            "espeak-ng".into(),
            "-v".into(),
            "{locale}".into(),
            "{text}".into(),
        ]));
        assert!(synth.is_available());
        assert_eq!(
            synth.argv(&utterance("Bonjour")).unwrap(),
            vec!["espeak-ng", "-v", "fr-FR", "Bonjour"]
        );
    }

    #[test]
    fn synthesizer_appends_text_when_not_mentioned() {
        let synth = CommandSynthesizer::new(Some(vec!["say".into()]));
        assert_eq!(synth.argv(&utterance("Salut")).unwrap(), vec!["say", "Salut"]);
    }

    #[test]
    fn empty_command_is_unavailable() {
        assert!(!CommandSynthesizer::new(Some(vec![])).is_available());
        assert!(!CommandSynthesizer::new(None).is_available());
    }

    #[test]
    fn player_caches_and_releases_clip() {
        let dir = tempfile::tempdir().unwrap();
        let player = CommandPlayer::new(None, dir.path().join("audio"));

        let resource = player
            .load(AudioClip {
                data: vec![1, 2, 3],
                mime_type: "audio/mp3",
            })
            .unwrap();
        assert!(resource.location.ends_with(".mp3"));
        assert_eq!(fs::read(&resource.location).unwrap(), vec![1, 2, 3]);

        player.release(&resource).unwrap();
        assert!(!Path::new(&resource.location).exists());
        // Releasing twice is harmless.
        player.release(&resource).unwrap();
    }

    #[tokio::test]
    async fn player_without_command_fails_to_play() {
        let dir = tempfile::tempdir().unwrap();
        let player = CommandPlayer::new(None, dir.path());
        let resource = player
            .load(AudioClip {
                data: vec![0],
                mime_type: "audio/mp3",
            })
            .unwrap();
        assert!(matches!(
            player.play(&resource).await,
            Err(PlaybackError::Playback(_))
        ));
    }

    #[tokio::test]
    async fn clipboard_without_command_is_unavailable() {
        let clipboard = CommandClipboard::new(None);
        assert_eq!(
            clipboard.write_text("hi").await,
            Err(ClipboardError::Unavailable)
        );
    }
}
