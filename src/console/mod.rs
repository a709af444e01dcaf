//! Terminal front-end: a printing UI surface, process-backed speech,
//! audio and clipboard, and the line commands of the REPL.

pub mod commands;
pub mod process;
pub mod ui;

pub use commands::{parse_line, ReplCommand};
pub use process::{CommandClipboard, CommandPlayer, CommandSynthesizer};
pub use ui::ConsoleUi;
