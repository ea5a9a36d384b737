//! Game state machine: placement, movement, capture and win detection
//!
//! Every inbound event is handled to completion in a single call and
//! yields the notifications the presentation layer should apply, in order.
//! Refused events leave the game untouched and produce one advisory.

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::notify::{Notification, Notifier, Rejection};
use crate::ruleset::RuleSet;
use crate::state::{BoardError, BoardState, Player};
use crate::transcript::Transcript;

// ============================================================================
// CONSTANTS
// ============================================================================

/// A player left with this many tokens (in hand plus on board) has lost
pub const LOSING_TOKEN_COUNT: u8 = 2;

/// Tokens on board at which a player may fly, when the rules allow it
pub const FLYING_TOKEN_COUNT: u8 = 3;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Which events are meaningful right now
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Placing,
    Moving,
    CaptureSelection,
    GameOver,
}

/// Inbound event from the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A click on a position; its meaning depends on the phase
    PlaceOrSelect { position: Position },
    /// Remove the selected enemy token, or skip the capture if none is selected
    ConfirmCapture,
    /// The current player forfeits
    Surrender,
    /// Start a new game
    Reset,
}

/// Turn bookkeeping
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    phase: Phase,
    current_player: Player,
    /// Token chosen to move, or enemy token chosen for removal
    selected: Option<Position>,
    pending_capture: bool,
    winner: Option<Player>,
}

impl GameState {
    fn new() -> Self {
        Self {
            phase: Phase::Placing,
            current_player: Player::A,
            selected: None,
            pending_capture: false,
            winner: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn pending_capture(&self) -> bool {
        self.pending_capture
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }
}

// ============================================================================
// GAME
// ============================================================================

/// Rule engine owning the board and turn state
#[derive(Clone, Debug)]
pub struct Game {
    rules: RuleSet,
    board: BoardState,
    state: GameState,
    /// Inbound events since the last reset
    record: Transcript,
}

impl Game {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game with player A to place. `rules` should already be validated.
    pub fn new(rules: RuleSet) -> Self {
        let board = BoardState::new(rules.tokens_per_player);
        Self {
            record: Transcript::new(rules.clone()),
            rules,
            board,
            state: GameState::new(),
        }
    }

    /// Resume from an arbitrary board with `to_move` about to act
    pub fn from_board(rules: RuleSet, board: BoardState, to_move: Player) -> Self {
        let phase = if board.all_placed() {
            Phase::Moving
        } else {
            Phase::Placing
        };
        Self {
            record: Transcript::new(rules.clone()),
            rules,
            board,
            state: GameState {
                phase,
                current_player: to_move,
                ..GameState::new()
            },
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn current_player(&self) -> Player {
        self.state.current_player
    }

    pub fn selected(&self) -> Option<Position> {
        self.state.selected
    }

    pub fn winner(&self) -> Option<Player> {
        self.state.winner
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    /// Events handled since the last reset, replayable from a fresh game
    pub fn transcript(&self) -> Transcript {
        self.record.clone()
    }

    // ========================================================================
    // INBOUND EVENTS
    // ========================================================================

    pub fn place_or_select(&mut self, position: Position) -> Vec<Notification> {
        self.handle(Event::PlaceOrSelect { position })
    }

    pub fn confirm_capture(&mut self) -> Vec<Notification> {
        self.handle(Event::ConfirmCapture)
    }

    pub fn surrender(&mut self) -> Vec<Notification> {
        self.handle(Event::Surrender)
    }

    /// Start over with the same rules, redrawing the whole board
    pub fn reset(&mut self) -> Vec<Notification> {
        self.handle(Event::Reset)
    }

    /// Handle one event and return the resulting notifications
    pub fn handle(&mut self, event: Event) -> Vec<Notification> {
        let mut out = Vec::new();

        match event {
            Event::Reset => self.start_new_game(&mut out),
            Event::PlaceOrSelect { position } => {
                self.record.push(event);
                self.on_position(position, &mut out);
            }
            Event::ConfirmCapture => {
                self.record.push(event);
                self.on_confirm(&mut out);
            }
            Event::Surrender => {
                self.record.push(event);
                self.on_surrender(&mut out);
            }
        }

        out
    }

    /// Handle one event and forward each notification to `notifier`
    pub fn handle_with<N: Notifier + ?Sized>(&mut self, event: Event, notifier: &mut N) -> Vec<Notification> {
        let out = self.handle(event);
        for notification in &out {
            notification.dispatch(notifier);
        }
        out
    }

    /// Reducer form: handle `event` on a copy, leaving `self` untouched
    pub fn apply(&self, event: Event) -> (Self, Vec<Notification>) {
        let mut next = self.clone();
        let out = next.handle(event);
        (next, out)
    }

    // ========================================================================
    // RULE QUERIES
    // ========================================================================

    /// Whether `player` may currently move any token anywhere
    pub fn has_legal_move(&self, player: Player) -> bool {
        if self.can_fly(player) {
            self.board.empty_positions().next().is_some()
        } else {
            self.board.has_open_neighbour(player)
        }
    }

    /// Empty positions the token on `from` could move to
    pub fn legal_targets(&self, from: Position) -> Vec<Position> {
        let Some(owner) = self.board.owner_at(from) else {
            return Vec::new();
        };

        if self.can_fly(owner) {
            self.board.empty_positions().collect()
        } else {
            from.neighbours()
                .iter()
                .copied()
                .filter(|&q| self.board.is_empty_at(q))
                .collect()
        }
    }

    /// Enemy tokens the current player may remove right now
    pub fn capturable(&self) -> Vec<Position> {
        if self.state.phase != Phase::CaptureSelection {
            return Vec::new();
        }
        self.board
            .positions_of(self.state.current_player.opponent())
            .filter(|&p| self.can_capture(p))
            .collect()
    }

    /// Every event that would be accepted in the current state
    pub fn legal_events(&self) -> Vec<Event> {
        let select = |position: Position| Event::PlaceOrSelect { position };
        let mut events = Vec::new();

        match self.state.phase {
            Phase::GameOver => return events,
            Phase::Placing => {
                if self.board.tokens_to_place(self.state.current_player) > 0 {
                    events.extend(self.board.empty_positions().map(select));
                }
            }
            Phase::Moving => {
                events.extend(self.board.positions_of(self.state.current_player).map(select));
                if let Some(from) = self.state.selected {
                    events.extend(self.legal_targets(from).into_iter().map(select));
                }
            }
            Phase::CaptureSelection => {
                events.extend(self.capturable().into_iter().map(select));
                events.push(Event::ConfirmCapture);
            }
        }

        events.push(Event::Surrender);
        events
    }

    fn can_fly(&self, player: Player) -> bool {
        self.rules.allow_flying && self.board.tokens_on_board(player) == FLYING_TOKEN_COUNT
    }

    // Mill membership is recomputed on every call, the board changes each turn
    fn can_capture(&self, p: Position) -> bool {
        let opponent = self.state.current_player.opponent();
        self.board.owner_at(p) == Some(opponent)
            && (!self.board.forms_mill(p, opponent) || !self.board.has_free_token(opponent))
    }

    // The no-move loss here applies whatever `check_checkmate` says
    fn has_lost(&self, player: Player) -> bool {
        if self.board.total_tokens(player) <= LOSING_TOKEN_COUNT {
            return true;
        }
        self.board.all_placed() && !self.has_legal_move(player)
    }

    // ========================================================================
    // EVENT HANDLERS
    // ========================================================================

    fn on_position(&mut self, p: Position, out: &mut Vec<Notification>) {
        match self.state.phase {
            Phase::Placing => self.place_token(p, out),
            Phase::Moving => self.select_or_move(p, out),
            Phase::CaptureSelection => self.select_capture(p, out),
            Phase::GameOver => self.reject(Rejection::GameOver, out),
        }
    }

    fn place_token(&mut self, p: Position, out: &mut Vec<Notification>) {
        let player = self.state.current_player;
        match self.board.owner_at(p) {
            Some(owner) if owner == player => return self.reject(Rejection::OwnPosition, out),
            Some(_) => return self.reject(Rejection::OpponentPosition, out),
            None => {}
        }
        if self.board.tokens_to_place(player) == 0 {
            return self.reject(Rejection::NoTokensInHand, out);
        }

        invariant(self.board.place(p, player));
        tracing::debug!(%player, position = %p, "Placed token");

        out.push(Notification::OwnershipChanged {
            position: p,
            owner: Some(player),
        });
        out.push(Notification::CounterChanged {
            player,
            remaining: self.board.tokens_to_place(player),
        });

        if self.board.all_placed() {
            tracing::debug!("All tokens placed");
        }

        self.after_arrival(p, out);
    }

    fn select_or_move(&mut self, p: Position, out: &mut Vec<Notification>) {
        let player = self.state.current_player;

        if self.board.owner_at(p) == Some(player) {
            self.state.selected = Some(p);
            tracing::debug!(%player, position = %p, "Selected token");
            out.push(Notification::FocusChanged { position: Some(p) });
            return;
        }

        let Some(from) = self.state.selected else {
            return self.reject(Rejection::NotYourToken, out);
        };
        if !self.board.is_empty_at(p) {
            return self.reject(Rejection::TargetOccupied, out);
        }
        if !from.is_neighbour(p) && !self.can_fly(player) {
            return self.reject(Rejection::NotAdjacent, out);
        }

        invariant(self.board.move_token(from, p, player));
        self.state.selected = None;
        tracing::debug!(%player, from = %from, to = %p, "Moved token");

        out.push(Notification::OwnershipChanged {
            position: from,
            owner: None,
        });
        out.push(Notification::TokenMoved {
            from,
            to: p,
            owner: player,
        });
        out.push(Notification::OwnershipChanged {
            position: p,
            owner: Some(player),
        });
        out.push(Notification::FocusChanged { position: None });

        let opponent = player.opponent();
        if self.rules.check_checkmate && !self.has_legal_move(opponent) {
            tracing::info!(%opponent, "No legal move left");
            return self.finish(player, out);
        }

        self.after_arrival(p, out);
    }

    fn select_capture(&mut self, p: Position, out: &mut Vec<Notification>) {
        let player = self.state.current_player;

        match self.board.owner_at(p) {
            Some(owner) if owner == player.opponent() => {
                if self.state.selected == Some(p) {
                    self.clear_capture_selection(out);
                } else if !self.can_capture(p) {
                    self.reject(Rejection::ProtectedByMill, out);
                } else {
                    self.state.selected = Some(p);
                    tracing::debug!(%player, position = %p, "Selected token for removal");
                    out.push(Notification::FocusChanged { position: Some(p) });
                    out.push(Notification::prompt("Press confirm to remove the selected token"));
                }
            }
            None if self.state.selected.is_some() => self.clear_capture_selection(out),
            _ => self.reject(Rejection::NotAnOpponentToken, out),
        }
    }

    fn on_confirm(&mut self, out: &mut Vec<Notification>) {
        match self.state.phase {
            Phase::CaptureSelection => {}
            Phase::GameOver => return self.reject(Rejection::GameOver, out),
            Phase::Placing | Phase::Moving => return self.reject(Rejection::NoCaptureToConfirm, out),
        }

        let player = self.state.current_player;
        let opponent = player.opponent();

        match self.state.selected.take() {
            Some(target) => {
                invariant(self.board.remove(target));
                tracing::debug!(%player, position = %target, "Captured token");
                out.push(Notification::OwnershipChanged {
                    position: target,
                    owner: None,
                });
                out.push(Notification::FocusChanged { position: None });
            }
            None => tracing::debug!(%player, "Skipped capture"),
        }

        if self.has_lost(opponent) {
            return self.finish(player, out);
        }
        self.end_turn(out);
    }

    fn on_surrender(&mut self, out: &mut Vec<Notification>) {
        if self.state.phase == Phase::GameOver {
            return self.reject(Rejection::GameOver, out);
        }

        let loser = self.state.current_player;
        tracing::info!(%loser, "Surrendered");
        self.finish(loser.opponent(), out);
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// A token just landed on `p`: a mill interrupts the turn, otherwise it ends
    fn after_arrival(&mut self, p: Position, out: &mut Vec<Notification>) {
        let player = self.state.current_player;
        if self.board.forms_mill(p, player) {
            self.state.phase = Phase::CaptureSelection;
            self.state.pending_capture = true;
            self.state.selected = None;
            tracing::debug!(%player, position = %p, "Mill formed");
            out.push(Notification::prompt(capture_prompt(player)));
        } else {
            self.end_turn(out);
        }
    }

    fn clear_capture_selection(&mut self, out: &mut Vec<Notification>) {
        self.state.selected = None;
        out.push(Notification::FocusChanged { position: None });
        out.push(Notification::prompt(capture_prompt(self.state.current_player)));
    }

    fn end_turn(&mut self, out: &mut Vec<Notification>) {
        if self.state.selected.take().is_some() {
            out.push(Notification::FocusChanged { position: None });
        }
        self.state.pending_capture = false;
        self.state.current_player = self.state.current_player.opponent();
        self.state.phase = if self.board.all_placed() {
            Phase::Moving
        } else {
            Phase::Placing
        };

        let player = self.state.current_player;
        let text = match self.state.phase {
            Phase::Moving => format!("{} move one of your tokens", player),
            _ => format!("{} place a new token", player),
        };
        out.push(Notification::prompt(text));
    }

    fn finish(&mut self, winner: Player, out: &mut Vec<Notification>) {
        if self.state.selected.take().is_some() {
            out.push(Notification::FocusChanged { position: None });
        }
        self.state.phase = Phase::GameOver;
        self.state.pending_capture = false;
        self.state.winner = Some(winner);

        tracing::info!(%winner, "Game over");
        out.push(Notification::GameOver { winner });
    }

    fn start_new_game(&mut self, out: &mut Vec<Notification>) {
        self.board = BoardState::new(self.rules.tokens_per_player);
        self.state = GameState::new();
        self.record = Transcript::new(self.rules.clone());
        tracing::info!(rules = %self.rules.name, "New game");

        out.extend(Position::all().map(|position| Notification::OwnershipChanged {
            position,
            owner: None,
        }));
        out.push(Notification::FocusChanged { position: None });
        for player in Player::BOTH {
            out.push(Notification::CounterChanged {
                player,
                remaining: self.board.tokens_to_place(player),
            });
        }
        out.push(Notification::prompt(format!("{} place your token", Player::A)));
    }

    fn reject(&self, rejection: Rejection, out: &mut Vec<Notification>) {
        tracing::debug!(player = %self.state.current_player, ?rejection, "Rejected event");
        out.push(Notification::advisory(rejection));
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

fn capture_prompt(player: Player) -> String {
    format!("{} take enemy token if you wish", player)
}

/// Board primitives are only called after the engine's own guards passed
fn invariant<T>(result: Result<T, BoardError>) -> T {
    result.unwrap_or_else(|err| panic!("rule engine broke a board invariant: {}", err))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(ring: u8, index: u8) -> Position {
        Position::new(ring, index)
    }

    fn click(game: &mut Game, ring: u8, index: u8) -> Vec<Notification> {
        game.place_or_select(p(ring, index))
    }

    fn place_all(game: &mut Game, moves: &[(u8, u8)]) {
        for &(ring, index) in moves {
            let out = click(game, ring, index);
            assert!(rejection(&out).is_none(), "placing ({},{}) was rejected", ring, index);
        }
    }

    fn rejection(out: &[Notification]) -> Option<Rejection> {
        out.iter().find_map(|n| match n {
            Notification::Advisory { rejection, .. } => Some(*rejection),
            _ => None,
        })
    }

    fn last_prompt(out: &[Notification]) -> Option<&str> {
        out.iter().rev().find_map(|n| match n {
            Notification::DirectionPrompt { text } => Some(text.as_str()),
            _ => None,
        })
    }

    fn moving_game(rules: RuleSet, a: &[(u8, u8)], b: &[(u8, u8)], to_move: Player) -> Game {
        let setup: Vec<_> = a
            .iter()
            .map(|&(r, i)| (p(r, i), Player::A))
            .chain(b.iter().map(|&(r, i)| (p(r, i), Player::B)))
            .collect();
        let board = BoardState::from_setup([0, 0], &setup).unwrap();
        Game::from_board(rules, board, to_move)
    }

    #[test]
    fn test_game_creation() {
        let game = Game::default();
        assert_eq!(game.phase(), Phase::Placing);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.selected(), None);
        assert_eq!(game.winner(), None);
        assert_eq!(game.board().tokens_to_place(Player::B), 9);
    }

    #[test]
    fn test_place_passes_turn() {
        let mut game = Game::default();
        let out = click(&mut game, 0, 0);

        assert_eq!(
            out[0],
            Notification::OwnershipChanged {
                position: p(0, 0),
                owner: Some(Player::A)
            }
        );
        assert_eq!(
            out[1],
            Notification::CounterChanged {
                player: Player::A,
                remaining: 8
            }
        );
        assert_eq!(last_prompt(&out), Some("Player B place a new token"));
        assert_eq!(game.phase(), Phase::Placing);
        assert_eq!(game.current_player(), Player::B);
    }

    #[test]
    fn test_place_on_occupied_is_rejected() {
        let mut game = Game::default();
        click(&mut game, 0, 0);
        click(&mut game, 0, 1);

        let before_board = game.board().clone();
        let before_state = game.state().clone();

        assert_eq!(rejection(&click(&mut game, 0, 0)), Some(Rejection::OwnPosition));
        assert_eq!(rejection(&click(&mut game, 0, 1)), Some(Rejection::OpponentPosition));
        assert_eq!(game.board(), &before_board);
        assert_eq!(game.state(), &before_state);
    }

    #[test]
    fn test_mill_enters_capture_and_skip() {
        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 6)]);

        let out = click(&mut game, 0, 2);
        assert_eq!(game.phase(), Phase::CaptureSelection);
        assert!(game.state().pending_capture());
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(last_prompt(&out), Some("Player A take enemy token if you wish"));

        let out = game.confirm_capture();
        assert!(rejection(&out).is_none());
        assert_eq!(game.phase(), Phase::Placing);
        assert_eq!(game.current_player(), Player::B);
        assert!(!game.state().pending_capture());
        assert_eq!(game.board().tokens_on_board(Player::B), 2);
    }

    #[test]
    fn test_capture_removes_selected_token() {
        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 6), (0, 2)]);

        let out = click(&mut game, 2, 0);
        assert!(out.contains(&Notification::FocusChanged {
            position: Some(p(2, 0))
        }));
        assert_eq!(game.selected(), Some(p(2, 0)));

        let out = game.confirm_capture();
        assert!(out.contains(&Notification::OwnershipChanged {
            position: p(2, 0),
            owner: None
        }));
        assert_eq!(game.board().owner_at(p(2, 0)), None);
        assert_eq!(game.board().tokens_on_board(Player::B), 1);
        assert_eq!(game.board().total_tokens(Player::B), 8);
        assert_eq!(game.current_player(), Player::B);
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_mill_tokens_are_protected_while_free_tokens_remain() {
        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 1), (1, 5), (2, 2)]);
        // B formed a mill and skips the capture
        assert_eq!(game.phase(), Phase::CaptureSelection);
        game.confirm_capture();

        place_all(&mut game, &[(1, 3), (2, 5), (0, 2)]);
        assert_eq!(game.phase(), Phase::CaptureSelection);
        assert_eq!(game.capturable(), vec![p(2, 5)]);

        let out = click(&mut game, 2, 1);
        assert_eq!(rejection(&out), Some(Rejection::ProtectedByMill));
        assert_eq!(game.selected(), None);

        let out = click(&mut game, 2, 5);
        assert!(rejection(&out).is_none());
        assert_eq!(game.selected(), Some(p(2, 5)));
    }

    #[test]
    fn test_mill_tokens_capturable_when_all_protected() {
        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 1), (1, 5), (2, 2)]);
        game.confirm_capture();
        place_all(&mut game, &[(0, 2)]);

        assert_eq!(game.phase(), Phase::CaptureSelection);
        let out = click(&mut game, 2, 1);
        assert!(rejection(&out).is_none());
        assert_eq!(game.selected(), Some(p(2, 1)));
    }

    #[test]
    fn test_capture_selection_toggles() {
        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 6), (0, 2)]);

        click(&mut game, 2, 0);
        let out = click(&mut game, 2, 0);
        assert_eq!(game.selected(), None);
        assert!(out.contains(&Notification::FocusChanged { position: None }));

        click(&mut game, 2, 6);
        click(&mut game, 1, 1);
        assert_eq!(game.selected(), None);

        click(&mut game, 2, 6);
        let out = click(&mut game, 0, 1);
        assert_eq!(rejection(&out), Some(Rejection::NotAnOpponentToken));
        assert_eq!(game.selected(), Some(p(2, 6)));

        game.confirm_capture();
        assert_eq!(game.board().owner_at(p(2, 6)), None);
    }

    #[test]
    fn test_confirm_without_capture_is_rejected() {
        let mut game = Game::default();
        let out = game.confirm_capture();
        assert_eq!(rejection(&out), Some(Rejection::NoCaptureToConfirm));
        assert_eq!(game.current_player(), Player::A);
    }

    #[test]
    fn test_placing_ends_in_moving_phase() {
        let rules = RuleSet {
            tokens_per_player: 3,
            ..RuleSet::default()
        };
        let mut game = Game::new(rules);
        place_all(&mut game, &[(0, 0), (0, 1), (0, 3), (0, 2), (0, 6)]);
        assert_eq!(game.phase(), Phase::Placing);

        let out = click(&mut game, 0, 5);
        assert_eq!(game.phase(), Phase::Moving);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(last_prompt(&out), Some("Player A move one of your tokens"));
    }

    #[test]
    fn test_mill_on_last_placement_still_captures() {
        let rules = RuleSet {
            tokens_per_player: 4,
            ..RuleSet::default()
        };
        let mut game = Game::new(rules);
        place_all(
            &mut game,
            &[(0, 0), (1, 0), (0, 3), (1, 1), (0, 5), (2, 3), (2, 7), (1, 2)],
        );

        assert!(game.board().all_placed());
        assert_eq!(game.phase(), Phase::CaptureSelection);
        assert_eq!(game.current_player(), Player::B);

        game.confirm_capture();
        assert_eq!(game.phase(), Phase::Moving);
        assert_eq!(game.current_player(), Player::A);
    }

    #[test]
    fn test_move_to_adjacent() {
        let mut game = moving_game(
            RuleSet::default(),
            &[(0, 0), (0, 2), (1, 1), (2, 4)],
            &[(0, 4), (1, 6), (2, 0), (2, 2)],
            Player::A,
        );

        let out = click(&mut game, 0, 0);
        assert_eq!(out, vec![Notification::FocusChanged { position: Some(p(0, 0)) }]);
        assert_eq!(game.legal_targets(p(0, 0)), vec![p(0, 1), p(0, 7)]);

        let out = click(&mut game, 0, 7);
        assert!(out.contains(&Notification::TokenMoved {
            from: p(0, 0),
            to: p(0, 7),
            owner: Player::A
        }));
        assert_eq!(game.board().owner_at(p(0, 7)), Some(Player::A));
        assert_eq!(game.board().owner_at(p(0, 0)), None);
        assert_eq!(game.current_player(), Player::B);
        assert_eq!(game.phase(), Phase::Moving);
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_move_rejections() {
        let mut game = moving_game(
            RuleSet::default(),
            &[(0, 0), (0, 2), (1, 1), (2, 4)],
            &[(0, 4), (0, 7), (2, 0), (2, 2)],
            Player::A,
        );

        assert_eq!(rejection(&click(&mut game, 0, 1)), Some(Rejection::NotYourToken));
        assert_eq!(rejection(&click(&mut game, 0, 4)), Some(Rejection::NotYourToken));

        click(&mut game, 0, 0);
        assert_eq!(rejection(&click(&mut game, 0, 7)), Some(Rejection::TargetOccupied));
        assert_eq!(rejection(&click(&mut game, 1, 0)), Some(Rejection::NotAdjacent));
        assert_eq!(game.selected(), Some(p(0, 0)));

        // Clicking another own token switches the selection
        click(&mut game, 1, 1);
        assert_eq!(game.selected(), Some(p(1, 1)));
        assert_eq!(game.current_player(), Player::A);
    }

    #[test]
    fn test_flying_requires_rule_and_three_tokens() {
        let a = [(0, 0), (0, 2), (1, 1), (2, 4)];
        let b = [(0, 4), (1, 6), (2, 0)];

        let mut grounded = moving_game(RuleSet::default(), &a, &b, Player::B);
        click(&mut grounded, 0, 4);
        assert_eq!(rejection(&click(&mut grounded, 1, 3)), Some(Rejection::NotAdjacent));

        let mut flying = moving_game(RuleSet::with_flying(), &a, &b, Player::B);
        click(&mut flying, 0, 4);
        assert_eq!(flying.legal_targets(p(0, 4)).len(), 17);
        let out = click(&mut flying, 1, 3);
        assert!(rejection(&out).is_none());
        assert_eq!(flying.board().owner_at(p(1, 3)), Some(Player::B));

        // A has four tokens and may not fly
        click(&mut flying, 0, 0);
        assert_eq!(rejection(&click(&mut flying, 2, 7)), Some(Rejection::NotAdjacent));
    }

    #[test]
    fn test_blocking_every_token_wins() {
        let a = [(0, 1), (0, 3), (0, 7), (1, 5)];
        let b = [(0, 0), (0, 2), (0, 4)];

        let mut game = moving_game(RuleSet::default(), &a, &b, Player::A);
        click(&mut game, 1, 5);
        let out = click(&mut game, 0, 5);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.winner(), Some(Player::A));
        assert_eq!(out.last(), Some(&Notification::GameOver { winner: Player::A }));

        let mut flying = moving_game(RuleSet::with_flying(), &a, &b, Player::A);
        click(&mut flying, 1, 5);
        click(&mut flying, 0, 5);
        assert_eq!(flying.phase(), Phase::Moving);
        assert!(flying.has_legal_move(Player::B));

        let lenient = RuleSet {
            check_checkmate: false,
            ..RuleSet::default()
        };
        let mut game = moving_game(lenient, &a, &b, Player::A);
        click(&mut game, 1, 5);
        click(&mut game, 0, 5);
        assert_eq!(game.phase(), Phase::Moving);
        assert!(!game.has_legal_move(Player::B));
    }

    #[test]
    fn test_capture_down_to_two_wins() {
        let mut game = moving_game(
            RuleSet::default(),
            &[(0, 0), (0, 1), (0, 3)],
            &[(2, 0), (2, 4), (1, 6)],
            Player::A,
        );

        click(&mut game, 0, 3);
        click(&mut game, 0, 2);
        assert_eq!(game.phase(), Phase::CaptureSelection);

        click(&mut game, 2, 4);
        let out = game.confirm_capture();
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.winner(), Some(Player::A));
        assert_eq!(out.last(), Some(&Notification::GameOver { winner: Player::A }));
        assert_eq!(game.board().total_tokens(Player::B), 2);
    }

    #[test]
    fn test_capture_that_blocks_opponent_wins() {
        let a = [(0, 1), (0, 3), (0, 5), (0, 7), (2, 1), (1, 0)];
        let b = [(0, 0), (0, 2), (0, 4), (0, 6), (2, 4)];
        let lenient = RuleSet {
            check_checkmate: false,
            ..RuleSet::default()
        };

        for rules in [RuleSet::default(), lenient] {
            let mut game = moving_game(rules, &a, &b, Player::A);
            click(&mut game, 1, 0);
            click(&mut game, 1, 1);
            assert_eq!(game.phase(), Phase::CaptureSelection);

            click(&mut game, 2, 4);
            let out = game.confirm_capture();
            assert_eq!(out.last(), Some(&Notification::GameOver { winner: Player::A }));
            assert_eq!(game.winner(), Some(Player::A));
            assert_eq!(game.board().total_tokens(Player::B), 4);
        }
    }

    #[test]
    fn test_skipped_capture_against_blocked_opponent_wins() {
        let lenient = RuleSet {
            check_checkmate: false,
            ..RuleSet::default()
        };
        let mut game = moving_game(
            lenient,
            &[(0, 1), (0, 3), (0, 5), (0, 7), (2, 1), (1, 0)],
            &[(0, 0), (0, 2), (0, 4), (0, 6)],
            Player::A,
        );

        click(&mut game, 1, 0);
        click(&mut game, 1, 1);
        assert_eq!(game.phase(), Phase::CaptureSelection);
        assert!(!game.has_legal_move(Player::B));

        let out = game.confirm_capture();
        assert_eq!(out.last(), Some(&Notification::GameOver { winner: Player::A }));
        assert_eq!(game.board().total_tokens(Player::B), 4);
    }

    #[test]
    fn test_placing_with_empty_hand_is_rejected() {
        let board = BoardState::from_setup(
            [0, 1],
            &[(p(0, 0), Player::A), (p(1, 1), Player::B), (p(2, 2), Player::B)],
        )
        .unwrap();
        let mut game = Game::from_board(RuleSet::default(), board.clone(), Player::A);
        assert_eq!(game.phase(), Phase::Placing);

        let out = click(&mut game, 0, 3);
        assert_eq!(rejection(&out), Some(Rejection::NoTokensInHand));
        assert_eq!(game.board(), &board);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.legal_events(), vec![Event::Surrender]);
    }

    #[test]
    fn test_surrender_and_game_over_is_terminal() {
        let mut game = Game::default();
        click(&mut game, 0, 0);

        let out = game.surrender();
        assert_eq!(out, vec![Notification::GameOver { winner: Player::A }]);
        assert_eq!(game.winner(), Some(Player::A));

        assert_eq!(rejection(&click(&mut game, 1, 1)), Some(Rejection::GameOver));
        assert_eq!(rejection(&game.confirm_capture()), Some(Rejection::GameOver));
        assert_eq!(rejection(&game.surrender()), Some(Rejection::GameOver));
        assert!(game.legal_events().is_empty());
    }

    #[test]
    fn test_reset_redraws_everything() {
        let mut game = Game::default();
        click(&mut game, 0, 0);
        game.surrender();

        let out = game.reset();
        assert_eq!(out.len(), 24 + 1 + 2 + 1);
        assert_eq!(last_prompt(&out), Some("Player A place your token"));
        assert_eq!(game.phase(), Phase::Placing);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.winner(), None);
        assert_eq!(game.board(), &BoardState::new(9));
        assert!(game.transcript().events.is_empty());
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let game = Game::default();
        let (next, out) = game.apply(Event::PlaceOrSelect { position: p(1, 1) });

        assert!(!out.is_empty());
        assert_eq!(game.board().owner_at(p(1, 1)), None);
        assert_eq!(next.board().owner_at(p(1, 1)), Some(Player::A));
    }

    #[test]
    fn test_legal_events() {
        let game = Game::default();
        let events = game.legal_events();
        assert_eq!(events.len(), 25);
        assert_eq!(events.last(), Some(&Event::Surrender));

        let mut game = Game::default();
        place_all(&mut game, &[(0, 0), (2, 0), (0, 1), (2, 6), (0, 2)]);
        let events = game.legal_events();
        assert!(events.contains(&Event::ConfirmCapture));
        assert!(events.contains(&Event::PlaceOrSelect { position: p(2, 6) }));
        assert!(!events.contains(&Event::PlaceOrSelect { position: p(0, 1) }));
    }

    #[test]
    fn test_transcript_records_events() {
        let mut game = Game::default();
        click(&mut game, 0, 0);
        click(&mut game, 0, 0);
        game.confirm_capture();

        let transcript = game.transcript();
        assert_eq!(transcript.events.len(), 3);
        assert_eq!(transcript.events[2], Event::ConfirmCapture);
    }
}
