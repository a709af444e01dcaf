use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lingo_widget::config::Config;
use lingo_widget::console::commands::{language_list, HELP};
use lingo_widget::console::{
    parse_line, CommandClipboard, CommandPlayer, CommandSynthesizer, ConsoleUi, ReplCommand,
};
use lingo_widget::translate::HttpTranslationClient;
use lingo_widget::{Collaborators, Orchestrator, OrchestratorSettings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lingo_widget=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, loaded_path) = Config::discover()?;
    match &loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let client = Arc::new(HttpTranslationClient::new(
        config.server.base_url.clone(),
        config.server.request_timeout(),
    )?);
    match client.health_check().await {
        Ok(health) => info!(
            "Translation service at {}: {} ({} languages)",
            client.base_url(),
            health.status,
            health
                .supported_languages
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        ),
        Err(e) => warn!("Translation service at {} not reachable: {}", client.base_url(), e),
    }

    let ui = Arc::new(ConsoleUi::new());
    let collaborators = Collaborators {
        ui: ui.clone(),
        service: client,
        synthesizer: Arc::new(CommandSynthesizer::new(
            config.speech.synthesizer_command.clone(),
        )),
        player: Arc::new(CommandPlayer::new(
            config.speech.player_command.clone(),
            &config.speech.cache_dir,
        )),
        clipboard: Arc::new(CommandClipboard::new(config.clipboard.command.clone())),
    };
    let widget = Orchestrator::new(collaborators, OrchestratorSettings::from_config(&config)?);

    println!("{}", HELP);
    run_repl(&widget, &ui).await?;

    widget.reset();
    Ok(())
}

async fn run_repl(widget: &Orchestrator, ui: &ConsoleUi) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", ui.prompt());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        // Failures are already shown through the UI surface.
        let result = match command {
            ReplCommand::Translate(text) => {
                widget.on_input_changed(&text);
                widget.submit_translation().await.map(|_| ())
            }
            ReplCommand::From(source) => {
                let target = widget.snapshot().target;
                widget.on_language_selection_changed(source, target);
                Ok(())
            }
            ReplCommand::To(target) => {
                let source = widget.snapshot().source;
                widget.on_language_selection_changed(source, target);
                Ok(())
            }
            ReplCommand::Swap => widget.swap(),
            ReplCommand::Speak => widget.speak().await,
            ReplCommand::Stop => {
                widget.stop_playback();
                Ok(())
            }
            ReplCommand::Copy => widget.copy().await.map(|_| ()),
            ReplCommand::Clear => {
                widget.reset();
                Ok(())
            }
            ReplCommand::Langs => {
                println!("{}", language_list());
                Ok(())
            }
            ReplCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            ReplCommand::Quit => break,
        };

        if let Err(e) = result {
            debug!("Command failed: {}", e);
        }
    }

    Ok(())
}
