//! Binary entry point for keycache.
//!
//! This binary provides a stateless CLI over the deduplication service.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use keycache::cli::{CheckpointCommand, DedupeCommand};
use keycache::config::KeycacheConfig;
use keycache::observability::{self, LoggingConfig};
use keycache::{Deduplicator, Strategy};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Keycache - bounded key-cache deduplication for polled record streams.
#[derive(Parser)]
#[command(name = "keycache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "KEYCACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
struct CommonArgs {
    /// Ordering strategy: sorted-items, sorted-keys or unsorted.
    #[arg(short, long, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// Record field (or JSON pointer such as `/meta/seq`) used as the key.
    #[arg(short, long, env = "KEYCACHE_KEY_FIELD")]
    key_field: Option<String>,

    /// Read input from this file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Deduplicate a JSON batch against a key cache.
    Dedupe {
        #[command(flatten)]
        common: CommonArgs,

        /// Prior key cache as a JSON array; omit to prime.
        #[arg(long)]
        cache: Option<String>,
    },

    /// Deduplicate an envelope of `items` and `$checkpoint`.
    Checkpoint {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn parse_strategy(s: &str) -> Result<Strategy, keycache::DedupeError> {
    s.parse()
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match KeycacheConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command and returns its JSON output.
fn run_command(command: Commands, config: &KeycacheConfig) -> anyhow::Result<String> {
    let deduplicator = Deduplicator::new(config.dedupe);

    let output = match command {
        Commands::Dedupe { common, cache } => {
            let input = read_input(common.input.as_deref())?;
            let result = dedupe_command(deduplicator, common).run(&input, cache.as_deref())?;
            serde_json::to_string(&result).context("encoding output")?
        },
        Commands::Checkpoint { common } => {
            let input = read_input(common.input.as_deref())?;
            let result = CheckpointCommand::new(dedupe_command(deduplicator, common)).run(&input)?;
            serde_json::to_string(&result).context("encoding output")?
        },
    };

    Ok(output)
}

fn dedupe_command(deduplicator: Deduplicator, common: CommonArgs) -> DedupeCommand {
    DedupeCommand::new(deduplicator)
        .with_strategy(common.strategy)
        .with_key_field(common.key_field)
}

/// Reads the whole input document from a file or stdin.
fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input from {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading input from stdin")?;
            Ok(input)
        },
    }
}
