mod config;
mod runtime;
mod shell;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use quickscribe_audio::device::DeviceManager;
use quickscribe_foundation::{notification_channel, ShutdownHandler};

use crate::config::AppConfig;
use crate::runtime::{AppRuntime, RuntimeOptions};
use crate::shell::ShellCommand;

#[derive(Parser, Debug)]
#[command(name = "quickscribe", about = "Live dictation: microphone to cursor")]
struct Cli {
    /// Input device name (exact or substring match)
    #[arg(long)]
    device: Option<String>,

    /// Vosk model directory
    #[arg(long, env = "QUICKSCRIBE_MODEL_PATH")]
    model: Option<String>,

    /// Keep the transcript but never inject text at the cursor
    #[arg(long)]
    no_inject: bool,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Config file
    #[arg(long, default_value = "quickscribe.toml")]
    config: PathBuf,
}

fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "quickscribe.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    // Log to file only; stdout belongs to the shell.
    tracing_subscriber::fmt()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

fn list_devices() {
    let manager = DeviceManager::new();
    let default = manager.default_input_name();
    let names = manager.input_device_names();
    if names.is_empty() {
        println!("no input devices found");
        return;
    }
    for name in names {
        if Some(&name) == default.as_ref() {
            println!("{} (default)", name);
        } else {
            println!("{}", name);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_devices {
        list_devices();
        return Ok(());
    }

    init_logging()?;
    tracing::info!("starting quickscribe");

    let config = AppConfig::load_or_default(&cli.config)?;
    let opts = RuntimeOptions::merge(config, cli.device, cli.model, cli.no_inject);

    let (notifier, notification_rx) = notification_channel();
    let printer = shell::spawn_printer(notification_rx);

    let runtime =
        AppRuntime::start(opts, notifier.clone()).context("failed to start the pipeline")?;

    notifier.status(format!("ready. {}", shell::HELP));
    if let Some(name) = DeviceManager::new().default_input_name() {
        notifier.status(format!("default input device: {}", name));
    }

    let shutdown = ShutdownHandler::new().install().await;
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => match shell::parse_command(&line) {
                    Some(ShellCommand::Toggle) => runtime.toggle_recording(),
                    Some(ShellCommand::Clear) => runtime.clear_transcript(),
                    Some(ShellCommand::PasteAll) => runtime.paste_all(),
                    Some(ShellCommand::SetDevice(name)) => runtime.set_device(name),
                    Some(ShellCommand::Stats) => notifier.status(runtime.metrics().to_string()),
                    Some(ShellCommand::Help) => notifier.status(shell::HELP),
                    Some(ShellCommand::Quit) => break,
                    Some(ShellCommand::Unknown(input)) => {
                        notifier.status(format!("unknown command '{}'; {}", input, shell::HELP));
                    }
                    None => {}
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stdin error: {}", e);
                    break;
                }
            },
        }
    }

    tracing::info!("shutting down");
    // Stops any active capture stream before the process exits.
    runtime.shutdown();
    drop(notifier);
    let _ = printer.join();
    Ok(())
}
