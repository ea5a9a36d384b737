//! Text rendering of the board and of engine notifications

use morris_core::{BoardState, Game, Notifier, Phase, Player, Position, Rejection};

/// Board drawing; every `o` is a point
const BOARD_TEMPLATE: [&str; 13] = [
    "o-----o-----o",
    "|     |     |",
    "| o---o---o |",
    "| |   |   | |",
    "| | o-o-o | |",
    "| | |   | | |",
    "o-o-o   o-o-o",
    "| | |   | | |",
    "| | o-o-o | |",
    "| |   |   | |",
    "| o---o---o |",
    "|     |     |",
    "o-----o-----o",
];

const CENTER: usize = 6;
const EDGE: usize = 12;

/// Row and column of a point in `BOARD_TEMPLATE`
fn grid_cell(p: Position) -> (usize, usize) {
    let near = 2 * p.ring() as usize;
    let far = EDGE - near;
    match p.index() {
        0 => (near, near),
        1 => (near, CENTER),
        2 => (near, far),
        3 => (CENTER, far),
        4 => (far, far),
        5 => (far, CENTER),
        6 => (far, near),
        _ => (CENTER, near),
    }
}

/// `A`/`B` for tokens, lowercase when focused, `+` for empty points
fn symbol(owner: Option<Player>, focused: bool) -> char {
    let c = match owner {
        Some(Player::A) => 'A',
        Some(Player::B) => 'B',
        None => '+',
    };
    if focused {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

/// Draw the board as ASCII art
pub fn board_to_string(board: &BoardState, focus: Option<Position>) -> String {
    let mut grid: Vec<Vec<char>> = BOARD_TEMPLATE.iter().map(|row| row.chars().collect()).collect();

    for p in Position::all() {
        let (row, col) = grid_cell(p);
        grid[row][col] = symbol(board.owner_at(p), focus == Some(p));
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of whose turn it is
pub fn status_line(game: &Game) -> String {
    let board = game.board();
    let phase = match game.phase() {
        Phase::Placing => "placing",
        Phase::Moving => "moving",
        Phase::CaptureSelection => "capture",
        Phase::GameOver => "game over",
    };
    format!(
        "[{}] {} to act | A: {} on board, {} in hand | B: {} on board, {} in hand",
        phase,
        game.current_player(),
        board.tokens_on_board(Player::A),
        board.tokens_to_place(Player::A),
        board.tokens_on_board(Player::B),
        board.tokens_to_place(Player::B),
    )
}

/// Collects human-readable lines for each notification.
/// Ownership changes are not echoed; callers redraw the board instead.
#[derive(Default)]
pub struct TextNotifier {
    lines: Vec<String>,
}

impl TextNotifier {
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Notifier for TextNotifier {
    fn on_token_moved(&mut self, from: Position, to: Position, owner: Player) {
        self.lines.push(format!("{} moved {} -> {}", owner, from, to));
    }

    fn on_counter_changed(&mut self, player: Player, remaining: u8) {
        self.lines.push(format!("{} has {} tokens left to place", player, remaining));
    }

    fn on_focus_changed(&mut self, position: Option<Position>) {
        if let Some(p) = position {
            self.lines.push(format!("Selected {}", p));
        }
    }

    fn on_direction_prompt(&mut self, text: &str) {
        self.lines.push(format!("> {}", text));
    }

    fn on_advisory(&mut self, _rejection: Rejection, text: &str) {
        self.lines.push(format!("! {}", text));
    }

    fn on_game_over(&mut self, winner: Player) {
        self.lines.push(format!("*** {} won! ***", winner));
    }
}
