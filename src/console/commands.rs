use thiserror::Error;

use crate::languages::{Language, SourceLanguage, UnknownLanguage};

pub const HELP: &str = "\
Type text and press Enter to translate it.
  :from <code|auto>  set the source language
  :to <code>         set the target language
  :swap              swap languages and texts
  :speak             read the translation aloud
  :stop              stop speaking
  :copy              copy the translation
  :clear             clear everything
  :langs             list language codes
  :help              show this help
  :quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Translate(String),
    From(SourceLanguage),
    To(Language),
    Swap,
    Speak,
    Stop,
    Copy,
    Clear,
    Langs,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try :help)")]
    Unknown(String),

    #[error("Missing argument for :{0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Language(#[from] UnknownLanguage),
}

/// Parse one REPL line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Ok(Some(ReplCommand::Translate(line.to_string())));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let command = match name {
        "from" => ReplCommand::From(arg.ok_or(CommandError::MissingArgument("from"))?.parse()?),
        "to" => ReplCommand::To(arg.ok_or(CommandError::MissingArgument("to"))?.parse()?),
        "swap" => ReplCommand::Swap,
        "speak" => ReplCommand::Speak,
        "stop" => ReplCommand::Stop,
        "copy" => ReplCommand::Copy,
        "clear" => ReplCommand::Clear,
        "langs" => ReplCommand::Langs,
        "help" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// `code  Name` lines for `:langs`.
pub fn language_list() -> String {
    let mut lines = vec![format!("{:<6}{}", "auto", "Auto Detect")];
    lines.extend(
        Language::ALL
            .iter()
            .map(|lang| format!("{:<6}{}", lang.code(), lang.name())),
    );
    lines.join("\n")
}
