//! Replay command - feed a recorded transcript through a fresh engine

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use morris_core::{Game, Notification, Transcript};

use crate::render::{board_to_string, status_line, TextNotifier};

#[derive(Args)]
pub struct ReplayArgs {
    /// Transcript JSON file, as written by `play --record`
    #[arg(long, value_name = "FILE")]
    pub transcript: PathBuf,

    /// Print every notification as a JSON line instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let transcript = Transcript::load(&args.transcript)?;
    tracing::info!(
        "Replaying {} events with rules '{}'",
        transcript.events.len(),
        transcript.rules.name
    );

    let (game, notifications) = transcript.replay();

    if args.json {
        print_json_notifications(&notifications)?;
    } else {
        print_text_replay(&game, &notifications);
    }
    Ok(())
}

fn print_json_notifications(notifications: &[Notification]) -> Result<()> {
    for notification in notifications {
        println!("{}", serde_json::to_string(notification)?);
    }
    Ok(())
}

fn print_text_replay(game: &Game, notifications: &[Notification]) {
    let mut notifier = TextNotifier::default();
    for notification in notifications {
        notification.dispatch(&mut notifier);
    }
    for line in notifier.take_lines() {
        println!("{}", line);
    }

    println!();
    println!("{}", board_to_string(game.board(), game.selected()));
    println!("{}", status_line(game));
    match game.winner() {
        Some(winner) => println!("Result: {} won", winner),
        None => println!("Result: unfinished"),
    }
}
