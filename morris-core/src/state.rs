//! Board ownership and per-player token bookkeeping

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::{Position, NUM_POSITIONS};

/// Player identity. Player A always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A = 0,
    B = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::A, Player::B];

    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => f.write_str("Player A"),
            Player::B => f.write_str("Player B"),
        }
    }
}

/// Failed board primitive. The rule engine guards every call, so seeing
/// one of these from the engine means its own bookkeeping is broken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("position {0} is already occupied")]
    Occupied(Position),

    #[error("position {0} is not owned by {1}")]
    NotOwnedBy(Position, Player),

    #[error("position {0} is empty")]
    Vacant(Position),

    #[error("no position at ring {ring}, index {index}")]
    OutOfRange { ring: u8, index: u8 },

    #[error("{0} has no tokens left to place")]
    NoTokensLeft(Player),

    #[error("{player} owns {counted} positions but {recorded} tokens are recorded on the board")]
    CountMismatch {
        player: Player,
        counted: u8,
        recorded: u8,
    },
}

/// Ownership of all 24 positions plus token counters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    cells: [Option<Player>; NUM_POSITIONS],
    to_place: [u8; 2],
    on_board: [u8; 2],
}

impl BoardState {
    /// Empty board with `tokens_per_player` tokens in each hand
    pub fn new(tokens_per_player: u8) -> Self {
        Self {
            cells: [None; NUM_POSITIONS],
            to_place: [tokens_per_player; 2],
            on_board: [0; 2],
        }
    }

    /// Board with tokens already standing on it and `in_hand` left to place
    pub fn from_setup(in_hand: [u8; 2], setup: &[(Position, Player)]) -> Result<Self, BoardError> {
        let mut board = Self {
            cells: [None; NUM_POSITIONS],
            to_place: in_hand,
            on_board: [0; 2],
        };

        for &(p, player) in setup {
            if !board.is_empty_at(p) {
                return Err(BoardError::Occupied(p));
            }
            board.cells[p.to_index()] = Some(player);
            board.on_board[player.index()] += 1;
        }

        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn owner_at(&self, p: Position) -> Option<Player> {
        self.cells[p.to_index()]
    }

    pub fn is_empty_at(&self, p: Position) -> bool {
        self.owner_at(p).is_none()
    }

    /// Tokens still in the player's hand
    pub fn tokens_to_place(&self, player: Player) -> u8 {
        self.to_place[player.index()]
    }

    /// Tokens the player currently has on the board
    pub fn tokens_on_board(&self, player: Player) -> u8 {
        self.on_board[player.index()]
    }

    /// Tokens in hand plus tokens on the board
    pub fn total_tokens(&self, player: Player) -> u8 {
        self.tokens_to_place(player) + self.tokens_on_board(player)
    }

    /// True once both hands are empty
    pub fn all_placed(&self) -> bool {
        self.to_place.iter().all(|&n| n == 0)
    }

    pub fn positions_of(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(move |&p| self.owner_at(p) == Some(player))
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(move |&p| self.is_empty_at(p))
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Put a token from `player`'s hand on an empty position
    pub fn place(&mut self, p: Position, player: Player) -> Result<(), BoardError> {
        if !self.is_empty_at(p) {
            return Err(BoardError::Occupied(p));
        }
        if self.to_place[player.index()] == 0 {
            return Err(BoardError::NoTokensLeft(player));
        }

        self.cells[p.to_index()] = Some(player);
        self.to_place[player.index()] -= 1;
        self.on_board[player.index()] += 1;
        Ok(())
    }

    /// Move one of `player`'s tokens to an empty position
    pub fn move_token(&mut self, from: Position, to: Position, player: Player) -> Result<(), BoardError> {
        if self.owner_at(from) != Some(player) {
            return Err(BoardError::NotOwnedBy(from, player));
        }
        if !self.is_empty_at(to) {
            return Err(BoardError::Occupied(to));
        }

        self.cells[from.to_index()] = None;
        self.cells[to.to_index()] = Some(player);
        Ok(())
    }

    /// Take a token off the board, returning its former owner
    pub fn remove(&mut self, p: Position) -> Result<Player, BoardError> {
        let owner = self.owner_at(p).ok_or(BoardError::Vacant(p))?;
        self.cells[p.to_index()] = None;
        self.on_board[owner.index()] -= 1;
        Ok(owner)
    }

    // ========================================================================
    // MILL QUERIES
    // ========================================================================

    /// Whether any mill through `p` is fully owned by `player`
    pub fn forms_mill(&self, p: Position, player: Player) -> bool {
        p.mills()
            .iter()
            .any(|mill| mill.positions().iter().all(|&q| self.owner_at(q) == Some(player)))
    }

    /// Whether the token on `p` sits inside a formed mill
    pub fn in_mill(&self, p: Position) -> bool {
        self.owner_at(p).is_some_and(|owner| self.forms_mill(p, owner))
    }

    /// Whether `player` has at least one token outside every mill
    pub fn has_free_token(&self, player: Player) -> bool {
        self.positions_of(player).any(|p| !self.forms_mill(p, player))
    }

    /// Whether any of `player`'s tokens has an empty neighbour
    pub fn has_open_neighbour(&self, player: Player) -> bool {
        self.positions_of(player)
            .any(|p| p.neighbours().iter().any(|&q| self.is_empty_at(q)))
    }

    /// Recount owned positions and compare with the recorded counters
    pub fn verify(&self) -> Result<(), BoardError> {
        for player in Player::BOTH {
            let counted = self.positions_of(player).count() as u8;
            let recorded = self.tokens_on_board(player);
            if counted != recorded {
                return Err(BoardError::CountMismatch {
                    player,
                    counted,
                    recorded,
                });
            }
        }
        Ok(())
    }
}
