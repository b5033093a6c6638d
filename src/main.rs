//! Artboard CLI
//!
//! Command-line interface for the Artboard adjustment layer compositor.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use artboard::cli::{commands, Cli, Commands};
use artboard::EngineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("ARTBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Artboard v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Artboard v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: EngineConfig) -> Result<()> {
    match cmd {
        Commands::Composite { document, json } => commands::composite(&document, config, json)
            .with_context(|| format!("failed to composite '{}'", document.display())),
        Commands::Inspect { document } => commands::inspect(&document)
            .with_context(|| format!("failed to inspect '{}'", document.display())),
        Commands::Lut {
            points,
            channel,
            intensity,
        } => commands::lut(&points, channel, intensity).context("failed to build curve"),
        Commands::Check { dir } => {
            commands::check(&dir).with_context(|| format!("check failed in '{}'", dir.display()))
        }
    }
}
