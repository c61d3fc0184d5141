//! Smartcab CLI - trains a Q-learning cab in the reference grid world

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use crate::commands::{config as config_cmd, train};
use crate::config::{Config, LoggingConfig};

#[derive(Parser)]
#[command(name = "smartcab")]
#[command(author, version, about = "Smartcab - a cab that learns the rules of the road", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent over a series of trials
    Train(train::TrainArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("smartcab={level},smartcab_rl={level},smartcab_sim={level}").into()
    });

    let json = logging.json.then(|| tracing_subscriber::fmt::layer().json());
    let text = (!logging.json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file must not stop `config init --force` from replacing it
    let config = match &cli.command {
        Commands::Config(config_cmd::ConfigCommands::Init { .. }) => Config::default(),
        _ => Config::load()?,
    };

    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Train(args) => train::run(&args, config),
        Commands::Config(cmd) => config_cmd::run(cmd, &config),
    }
}
