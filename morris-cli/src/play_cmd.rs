//! Play command - interactive game on stdin/stdout
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_session(), save_record()
//! - Level 3: parse_command(), print_update()
//! - Level 4: position parsing

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use morris_core::{Event, Game, Position};

use crate::render::{board_to_string, status_line, TextNotifier};

const HELP: &str = "\
Commands:
  R I | p R I   place a token, select a token, or pick a move/capture target
                (R = ring 0-2 outer to inner, I = index 0-7 clockwise from top-left)
  c             confirm the capture (with nothing selected, skip it)
  s             surrender
  r             start a new game
  b             show the board
  h             show this help
  q             quit";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Rules JSON file
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Allow a player down to three tokens to fly
    #[arg(long)]
    pub flying: bool,

    /// Save the transcript of the current game here on exit
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,
}

/// One line of user input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Event(Event),
    Board,
    Help,
    Quit,
    Nothing,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load rules
/// 2. Play until quit or end of input
/// 3. Optionally save the transcript
pub fn run(args: PlayArgs) -> Result<()> {
    let rules = crate::load_rules(args.rules.as_deref(), args.flying)?;
    tracing::info!("Starting game with rules '{}'", rules.name);

    let game = play_session(Game::new(rules))?;

    if let Some(path) = &args.record {
        save_record(&game, path)?;
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Feed stdin commands into the engine until quit
fn play_session(mut game: Game) -> Result<Game> {
    let mut notifier = TextNotifier::default();

    println!("{}", HELP);
    game.handle_with(Event::Reset, &mut notifier);
    print_update(&game, &mut notifier);

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        match parse_command(&line) {
            Ok(Command::Event(event)) => {
                game.handle_with(event, &mut notifier);
                print_update(&game, &mut notifier);
            }
            Ok(Command::Board) => print_update(&game, &mut notifier),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => break,
            Ok(Command::Nothing) => {}
            Err(err) => println!("? {}", err),
        }
    }

    Ok(game)
}

fn save_record(game: &Game, path: &Path) -> Result<()> {
    let transcript = game.transcript();
    transcript.save(path)?;
    tracing::info!("Saved {} events to {}", transcript.events.len(), path.display());
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();

    let command = match words.as_slice() {
        [] => Command::Nothing,
        ["c" | "confirm"] => Command::Event(Event::ConfirmCapture),
        ["s" | "surrender"] => Command::Event(Event::Surrender),
        ["r" | "reset"] => Command::Event(Event::Reset),
        ["b" | "board"] => Command::Board,
        ["h" | "help" | "?"] => Command::Help,
        ["q" | "quit" | "exit"] => Command::Quit,
        ["p" | "place" | "select", ring, index] | [ring, index] => Command::Event(Event::PlaceOrSelect {
            position: parse_position(ring, index)?,
        }),
        _ => bail!("unknown command '{}', type 'h' for help", line.trim()),
    };

    Ok(command)
}

fn print_update(game: &Game, notifier: &mut TextNotifier) {
    for line in notifier.take_lines() {
        println!("{}", line);
    }
    println!();
    println!("{}", board_to_string(game.board(), game.selected()));
    println!("{}", status_line(game));
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_position(ring: &str, index: &str) -> Result<Position> {
    let ring: u8 = ring.parse().with_context(|| format!("ring '{}' is not a number", ring))?;
    let index: u8 = index.parse().with_context(|| format!("index '{}' is not a number", index))?;
    Ok(Position::try_new(ring, index)?)
}

// ============================================================================
// TESTS
// ============================================================================
