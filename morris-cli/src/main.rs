//! Morris CLI - Command-line front end for the rule engine
//!
//! Commands:
//! - play: Play a game on the terminal
//! - replay: Replay a recorded transcript
//! - soak: Play seeded random games while checking engine invariants

mod play_cmd;
mod render;
mod replay_cmd;
mod soak_cmd;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use morris_core::RuleSet;

#[derive(Parser)]
#[command(name = "morris")]
#[command(about = "Nine Men's Morris rule engine")]
struct Cli {
    /// Log every engine transition
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game on the terminal
    Play(play_cmd::PlayArgs),
    /// Replay a recorded transcript
    Replay(replay_cmd::ReplayArgs),
    /// Play random games and check engine invariants
    Soak(soak_cmd::SoakArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Replay(args) => replay_cmd::run(args),
        Commands::Soak(args) => soak_cmd::run(args),
    }
}

/// Logs go to stderr so JSON output on stdout stays clean
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Rules from a file (or the defaults), with `--flying` layered on top
fn load_rules(path: Option<&Path>, flying: bool) -> Result<RuleSet> {
    let mut rules = match path {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::default(),
    };
    if flying {
        rules.allow_flying = true;
    }
    rules.validate()?;

    tracing::debug!(?rules, "Loaded rules");
    Ok(rules)
}
