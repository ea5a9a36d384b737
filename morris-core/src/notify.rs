//! Outbound notifications toward the presentation layer

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::state::Player;

/// Why an inbound event was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Placing on a point the mover already holds
    OwnPosition,
    /// Placing on a point the opponent holds
    OpponentPosition,
    /// Placing with an empty hand, only reachable from a resumed board
    NoTokensInHand,
    /// Moving phase click on something other than an own token, with nothing selected
    NotYourToken,
    /// Move target is occupied
    TargetOccupied,
    /// Move target is not adjacent and flying does not apply
    NotAdjacent,
    /// Capture click on something other than an enemy token
    NotAnOpponentToken,
    /// Capture click on an enemy token that sits in a mill
    ProtectedByMill,
    /// Confirm outside of capture selection
    NoCaptureToConfirm,
    /// Anything but reset after the game ended
    GameOver,
}

impl Rejection {
    /// Advisory text shown to the player
    pub fn message(self) -> &'static str {
        match self {
            Rejection::OwnPosition => "You have already taken this point",
            Rejection::OpponentPosition => "This point is taken by your opponent",
            Rejection::NoTokensInHand => "You have no tokens left to place",
            Rejection::NotYourToken => "It's moving phase, choose one of your tokens",
            Rejection::TargetOccupied => "You must choose a free place",
            Rejection::NotAdjacent => "You must choose a place neighbouring the selected token",
            Rejection::NotAnOpponentToken => "Please select an enemy token for removal",
            Rejection::ProtectedByMill => "You must remove a token that doesn't form a mill",
            Rejection::NoCaptureToConfirm => "There is no capture to confirm",
            Rejection::GameOver => "The game is over, start a new one",
        }
    }
}

/// Something the presentation layer should reflect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Redraw a single position
    OwnershipChanged { position: Position, owner: Option<Player> },
    /// A token travelled between positions; the engine does not wait for any animation
    TokenMoved { from: Position, to: Position, owner: Player },
    /// Tokens left in a player's hand
    CounterChanged { player: Player, remaining: u8 },
    /// Highlight a position, or clear the highlight
    FocusChanged { position: Option<Position> },
    /// Guidance for the active player
    DirectionPrompt { text: String },
    /// Transient message for a refused action
    Advisory { rejection: Rejection, text: String },
    /// The game ended
    GameOver { winner: Player },
}

impl Notification {
    pub fn advisory(rejection: Rejection) -> Self {
        Notification::Advisory {
            rejection,
            text: rejection.message().to_string(),
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Notification::DirectionPrompt { text: text.into() }
    }

    /// Forward to the matching `Notifier` callback
    pub fn dispatch<N: Notifier + ?Sized>(&self, notifier: &mut N) {
        match self {
            Notification::OwnershipChanged { position, owner } => {
                notifier.on_ownership_changed(*position, *owner)
            }
            Notification::TokenMoved { from, to, owner } => notifier.on_token_moved(*from, *to, *owner),
            Notification::CounterChanged { player, remaining } => {
                notifier.on_counter_changed(*player, *remaining)
            }
            Notification::FocusChanged { position } => notifier.on_focus_changed(*position),
            Notification::DirectionPrompt { text } => notifier.on_direction_prompt(text),
            Notification::Advisory { rejection, text } => notifier.on_advisory(*rejection, text),
            Notification::GameOver { winner } => notifier.on_game_over(*winner),
        }
    }
}

/// Presentation-side receiver. Callbacks must not call back into the engine.
pub trait Notifier {
    fn on_ownership_changed(&mut self, _position: Position, _owner: Option<Player>) {}

    fn on_token_moved(&mut self, _from: Position, _to: Position, _owner: Player) {}

    fn on_counter_changed(&mut self, _player: Player, _remaining: u8) {}

    fn on_focus_changed(&mut self, _position: Option<Position>) {}

    fn on_direction_prompt(&mut self, _text: &str) {}

    fn on_advisory(&mut self, _rejection: Rejection, _text: &str) {}

    fn on_game_over(&mut self, _winner: Player) {}
}
