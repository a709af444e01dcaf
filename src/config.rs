use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::languages::{Language, SourceLanguage};
use crate::translate::interface::MAX_CHARS;
use crate::tts::VoiceSettings;

/// Environment variable pointing at a config file.
pub const CONFIG_PATH_ENV: &str = "LINGO_WIDGET_CONFIG";
/// Environment variable overriding `server.base_url`.
pub const SERVER_URL_ENV: &str = "LINGO_SERVER_URL";

const CONFIG_FILE_NAMES: [&str; 3] = ["lingo-widget.yaml", "lingo-widget.yml", "lingo-widget.json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Limits and timings of the widget itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_error_dismiss_ms")]
    pub error_dismiss_ms: u64,
    #[serde(default = "default_copy_ack_ms")]
    pub copy_ack_ms: u64,
    #[serde(default = "default_source_lang")]
    pub default_source_lang: String,
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
}

fn default_max_chars() -> usize {
    MAX_CHARS
}

fn default_error_dismiss_ms() -> u64 {
    5000
}

fn default_copy_ack_ms() -> u64 {
    1500
}

fn default_source_lang() -> String {
    "auto".to_string()
}

fn default_target_lang() -> String {
    "es".to_string()
}

impl WidgetConfig {
    pub fn error_dismiss(&self) -> Duration {
        Duration::from_millis(self.error_dismiss_ms)
    }

    pub fn copy_ack(&self) -> Duration {
        Duration::from_millis(self.copy_ack_ms)
    }

    pub fn source_lang(&self) -> Result<SourceLanguage> {
        self.default_source_lang
            .parse()
            .with_context(|| "widget.default_source_lang")
    }

    pub fn target_lang(&self) -> Result<Language> {
        self.default_target_lang
            .parse()
            .with_context(|| "widget.default_target_lang")
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            error_dismiss_ms: default_error_dismiss_ms(),
            copy_ack_ms: default_copy_ack_ms(),
            default_source_lang: default_source_lang(),
            default_target_lang: default_target_lang(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(flatten)]
    pub voice: VoiceSettings,
    /// On-device synthesizer, e.g. `["espeak-ng", "-v", "{locale}", "{text}"]`.
    #[serde(default)]
    pub synthesizer_command: Option<Vec<String>>,
    /// Player for server audio; the file path is appended.
    #[serde(default)]
    pub player_command: Option<Vec<String>>,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: VoiceSettings::default(),
            synthesizer_command: None,
            player_command: None,
            cache_dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Command that reads the text on stdin, e.g. `["wl-copy"]`.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

impl Config {
    /// Load a config file. `.json`/`.jsonld` is parsed as JSON, anything else as YAML.
    pub fn load(path: &str) -> Result<Self> {
        let content = read_with_env(path)?;

        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".jsonld") || path_lower.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON config: {}", path))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML config: {}", path))?
        };
        Ok(config)
    }

    /// Find and load the first config file from the usual places.
    ///
    /// Returns defaults (and `None` as the path) when there is no file.
    pub fn discover() -> Result<(Self, Option<PathBuf>)> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            // An explicit path must exist.
            let config = Self::load(&path)?.with_env_overrides();
            return Ok((config, Some(PathBuf::from(path))));
        }
        candidates.extend(CONFIG_FILE_NAMES.iter().map(PathBuf::from));
        if let Some(dir) = exe_dir {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)));
        }

        for path in candidates {
            if !path.exists() {
                continue;
            }
            let path_str = path.to_string_lossy().to_string();
            let config = Self::load(&path_str)?;
            return Ok((config.with_env_overrides(), Some(path)));
        }

        debug!("No config file found, using defaults");
        Ok((Self::default().with_env_overrides(), None))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url;
            }
        }
        self
    }
}

/// Read a text file and substitute `${VAR}` from the environment.
///
/// Unset variables are left as written.
pub fn read_with_env(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("Configuration file not found: {}", path);
    }

    let content = load_text_file(path)?;
    Ok(substitute_env(&content))
}

pub fn substitute_env(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static regex");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// UTF-8 (BOM stripped) with a GBK fallback for legacy files.
fn load_text_file(path: &str) -> Result<String> {
    let mut bytes = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            let (cow, _, had_errors) = encoding_rs::GBK.decode(e.as_bytes());
            if had_errors {
                debug!("Config {} is neither UTF-8 nor GBK, decoding lossily", path);
            }
            Ok(cow.into_owned())
        }
    }
}
