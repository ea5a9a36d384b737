//! Morris Core - Rule engine for Nine Men's Morris
//!
//! This crate provides the game logic only:
//! - Board topology (24 points on three squares, mills and adjacency)
//! - Ownership and token bookkeeping
//! - The placement / movement / capture state machine
//! - Notifications for whatever presentation layer drives it
//! - Adjustable rules and replayable transcripts
//!
//! The engine is a single-threaded reducer. Callers must serialize events.

pub mod board;
pub mod game;
pub mod notify;
pub mod ruleset;
pub mod state;
pub mod transcript;

// Re-exports for convenient access
pub use board::{Mill, Position, Topology, NUM_MILLS, NUM_POSITIONS, TOPOLOGY};
pub use game::{Event, Game, GameState, Phase, FLYING_TOKEN_COUNT, LOSING_TOKEN_COUNT};
pub use notify::{Notification, Notifier, Rejection};
pub use ruleset::RuleSet;
pub use state::{BoardError, BoardState, Player};
pub use transcript::Transcript;
