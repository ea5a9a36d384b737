//! Soak command - play seeded random games and check engine invariants
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_soak(), compute_statistics()
//! - Level 3: play_random_game(), check_invariants()
//! - Level 4: create_rng(), printing helpers

use std::path::PathBuf;

use anyhow::{bail, ensure, Result};
use clap::Args;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use morris_core::{Event, Game, Notification, Player, RuleSet};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SoakArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Allow a player down to three tokens to fly
    #[arg(long)]
    pub flying: bool,

    /// Rules JSON file
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Events per game before it counts as unfinished
    #[arg(long, default_value = "2000")]
    pub max_events: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one random game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoakGame {
    pub game_number: usize,
    pub winner: Option<Player>,
    pub events: usize,
}

/// Aggregated soak results
#[derive(Clone, Debug)]
pub struct SoakResults {
    pub games: Vec<SoakGame>,
    pub a_wins: usize,
    pub b_wins: usize,
    pub unfinished: usize,
    pub avg_events: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run soak command
///
/// 1. Load rules
/// 2. Play random games, checking invariants after every event
/// 3. Compute and print statistics
pub fn run(args: SoakArgs) -> Result<()> {
    let rules = crate::load_rules(args.rules.as_deref(), args.flying)?;

    tracing::info!(
        "Soaking {} games with rules '{}' (seed: {:?})",
        args.games,
        rules.name,
        args.seed
    );

    let games = run_soak(&rules, &args)?;
    let results = compute_statistics(games);

    if args.json {
        print_json_results(&results);
    } else {
        print_text_results(&results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_soak(rules: &RuleSet, args: &SoakArgs) -> Result<Vec<SoakGame>> {
    let mut rng = create_rng(args.seed);
    let mut games = Vec::with_capacity(args.games);

    for game_number in 1..=args.games {
        let game = play_random_game(rules, game_number, args.max_events, &mut rng)?;
        tracing::debug!(?game, "Finished soak game");
        games.push(game);
    }

    Ok(games)
}

pub fn compute_statistics(games: Vec<SoakGame>) -> SoakResults {
    let a_wins = games.iter().filter(|g| g.winner == Some(Player::A)).count();
    let b_wins = games.iter().filter(|g| g.winner == Some(Player::B)).count();
    let unfinished = games.iter().filter(|g| g.winner.is_none()).count();

    let avg_events = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.events as f32).sum::<f32>() / games.len() as f32
    };

    SoakResults {
        games,
        a_wins,
        b_wins,
        unfinished,
        avg_events,
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Pick uniformly among accepted events until the game ends.
/// Surrender is left out so games are decided on the board.
fn play_random_game(
    rules: &RuleSet,
    game_number: usize,
    max_events: usize,
    rng: &mut ChaCha8Rng,
) -> Result<SoakGame> {
    let mut game = Game::new(rules.clone());
    game.reset();

    let mut events = 0;
    while !game.is_over() && events < max_events {
        let candidates: Vec<Event> = game
            .legal_events()
            .into_iter()
            .filter(|e| *e != Event::Surrender)
            .collect();
        let Some(&event) = candidates.choose(rng) else {
            bail!("game {}: no event available in {:?}", game_number, game.phase());
        };

        let before = game.clone();
        let out = game.handle(event);
        events += 1;

        if out.iter().any(|n| matches!(n, Notification::Advisory { .. })) {
            bail!("game {}: legal event {:?} was refused", game_number, event);
        }
        check_invariants(&before, &game)
            .map_err(|err| err.context(format!("game {} after event {}", game_number, events)))?;
    }

    Ok(SoakGame {
        game_number,
        winner: game.winner(),
        events,
    })
}

fn check_invariants(before: &Game, after: &Game) -> Result<()> {
    let board = after.board();
    board.verify()?;

    for player in Player::BOTH {
        let total = board.total_tokens(player);
        ensure!(
            total <= after.rules().tokens_per_player,
            "{} holds {} tokens, more than it started with",
            player,
            total
        );
        ensure!(
            total <= before.board().total_tokens(player),
            "{} gained tokens",
            player
        );
        if !after.is_over() {
            ensure!(total > 2, "{} is down to {} tokens but the game goes on", player, total);
        }
    }

    ensure!(
        after.is_over() == after.winner().is_some(),
        "winner {:?} does not match phase {:?}",
        after.winner(),
        after.phase()
    );
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &SoakResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<Player>,
        events: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        unfinished: usize,
        avg_events: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        unfinished: results.unfinished,
        avg_events: results.avg_events,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner,
                events: g.events,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &SoakResults) {
    let total = results.games.len();

    println!("\n=== Soak Results ===");
    println!("Total games: {}", total);
    println!("A wins:      {} ({:.1}%)", results.a_wins, percent(results.a_wins, total));
    println!("B wins:      {} ({:.1}%)", results.b_wins, percent(results.b_wins, total));
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg events:  {:.1}", results.avg_events);
    println!("All invariants held.");
}

// ============================================================================
// TESTS
// ============================================================================
