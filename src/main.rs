mod chat;
mod clipboard;
mod compress;
mod config;
mod error;
mod log;
mod markup;
mod notification;
mod payload;
mod services;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};

use chat::{ChatCoordinator, ChatWidget, ImageElement, InteractionOutcome, image_elements, on_image_click};
use config::{Config, Overrides};
use log::Logger;
use markup::{MODULE_NAME, anchorize};
use notification::NotificationManager;
use payload::ChatEvent;
use services::{JsonLineSink, PromptConfirmer, SystemPopout};

const USAGE: &str = "\
Usage: chat-images [options] <command>

Commands:
  send <text>...        Post a message, turning a lone image link into an image
  paste                 Post the image currently on the clipboard
  drop <path>...        Post the first image among the given files
  popout <url|content>  Open an image (or the images of a message) in the viewer

Options:
  --confirm             Ask before sending pasted or dropped images
  --no-compress         Send files without compressing them
  --quality <q>         Compression quality in (0, 1]
  --debug               Write debug output to ~/.chat-images/logs
  --trace               Attach backtraces to debug output
  -h, --help            Show this help";

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Cli {
    overrides: Overrides,
    command: Option<String>,
    args: Vec<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> Cli {
    let mut cli = Cli::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--confirm" => cli.overrides.require_confirmation = Some(true),
            "--no-compress" => cli.overrides.compress_files = Some(false),
            "--debug" => cli.overrides.debug = Some(true),
            "--trace" => {
                cli.overrides.debug = Some(true);
                cli.overrides.trace = Some(true);
            }
            "--quality" | "-q" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<f32>() {
                        Ok(q) => cli.overrides.compression_quality = Some(q),
                        Err(_) => eprintln!("Warning: '{}' is not a valid quality", args[i + 1]),
                    }
                    i += 2;
                    continue;
                } else {
                    eprintln!("Warning: --quality requires a value");
                }
            }
            "--help" | "-h" => cli.help = true,
            arg if cli.command.is_none() && !arg.starts_with('-') => {
                cli.command = Some(arg.to_string());
            }
            arg if cli.command.is_some() => cli.args.push(arg.to_string()),
            _ => {
                // Unknown flag, ignore
            }
        }
        i += 1;
    }

    cli
}

type Coordinator = ChatCoordinator<JsonLineSink<tokio::io::Stdout>, PromptConfirmer, NotificationManager>;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args);

    if cli.help || cli.command.is_none() {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().with_overrides(cli.overrides.clone());

    let logger = if config.debug {
        match Logger::init(config.debug, config.trace) {
            Ok((logger, path)) => {
                logger.log(&format!("Log file: {}", path.display()));
                logger
            }
            Err(e) => {
                eprintln!("Warning: Failed to open log file: {}", e);
                Logger::disabled()
            }
        }
    } else {
        Logger::disabled()
    };
    let logger = Arc::new(logger);

    let coordinator: Coordinator = ChatCoordinator::new(
        config.send_settings(),
        JsonLineSink::stdout(),
        PromptConfirmer::stdin(),
        NotificationManager::new(config.notifications.clone()),
        logger.clone(),
    );

    match cli.command.as_deref() {
        Some("send") => send_text(&coordinator, &cli.args.join(" ")).await,
        Some("paste") => {
            let event = clipboard::read_clipboard_event()?;
            handle_event(&coordinator, &config, &event).await
        }
        Some("drop") => {
            let paths: Vec<PathBuf> = cli
                .args
                .iter()
                .map(|arg| clipboard::parse_dropped_path(arg).unwrap_or_else(|| PathBuf::from(arg)))
                .collect();
            let event = clipboard::drop_event_from_paths(&paths);
            handle_event(&coordinator, &config, &event).await
        }
        Some("popout") => {
            open_popouts(&coordinator, logger, &cli.args.join(" "));
            Ok(())
        }
        Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
        None => Ok(()),
    }
}

async fn send_text(coordinator: &Coordinator, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Nothing to send");
    }

    let text = anchorize(text).unwrap_or_else(|| text.to_string());
    coordinator.send_text(&text).await?;
    Ok(())
}

async fn handle_event(coordinator: &Coordinator, config: &Config, event: &ChatEvent) -> Result<()> {
    let widget = ChatWidget::new("chat-message");

    match coordinator
        .handle_interaction(config.require_confirmation, Some(&widget), event)
        .await
    {
        InteractionOutcome::Sent { .. } => Ok(()),
        InteractionOutcome::NoImage => {
            eprintln!("No image found in {}", event.kind());
            Ok(())
        }
        InteractionOutcome::Declined => {
            eprintln!("Not sent");
            Ok(())
        }
        InteractionOutcome::Ignored(reason) => {
            eprintln!("Ignored: {:?}", reason);
            Ok(())
        }
        InteractionOutcome::Failed(e) => bail!(e),
    }
}

fn open_popouts(coordinator: &Coordinator, logger: Arc<Logger>, target: &str) {
    let images = if target.contains('<') {
        image_elements(target, MODULE_NAME)
    } else {
        vec![ImageElement {
            src: target.trim().to_string(),
        }]
    };

    if images.is_empty() {
        eprintln!("No chat images found");
        return;
    }

    let popout = SystemPopout::new(logger);
    for image in &images {
        on_image_click(&popout, coordinator.reporter(), image);
    }
}
