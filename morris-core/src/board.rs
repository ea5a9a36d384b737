//! Board geometry: three concentric squares of eight points each
//!
//! Rings are numbered outer to inner (0..3), points on a ring clockwise
//! starting from the top-left corner (0..8). Even indices are corners,
//! odd indices are the midpoints that connect neighbouring rings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::BoardError;

/// Number of concentric squares
pub const RINGS: u8 = 3;

/// Points on each square
pub const POINTS_PER_RING: u8 = 8;

/// Total points on the board
pub const NUM_POSITIONS: usize = (RINGS * POINTS_PER_RING) as usize;

/// Total mills on the board (12 along the rings, 4 across them)
pub const NUM_MILLS: usize = 16;

/// Most neighbours any point can have (midpoints of the middle ring)
const MAX_NEIGHBOURS: usize = 4;

/// Most mills any point can belong to
const MAX_MILLS_PER_POSITION: usize = 2;

/// A point on the board, addressed by ring and index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Position {
    ring: u8,
    index: u8,
}

impl Position {
    /// Create a position. Panics if `ring` or `index` is off the board,
    /// which makes out-of-range constants a compile error.
    pub const fn new(ring: u8, index: u8) -> Self {
        assert!(ring < RINGS && index < POINTS_PER_RING, "position off the board");
        Self { ring, index }
    }

    /// Create a position from untrusted input
    pub fn try_new(ring: u8, index: u8) -> Result<Self, BoardError> {
        if ring < RINGS && index < POINTS_PER_RING {
            Ok(Self { ring, index })
        } else {
            Err(BoardError::OutOfRange { ring, index })
        }
    }

    /// Position stored at a flat `ring * 8 + index` slot
    pub const fn from_index(slot: usize) -> Self {
        Self::new((slot / POINTS_PER_RING as usize) as u8, (slot % POINTS_PER_RING as usize) as u8)
    }

    pub const fn ring(self) -> u8 {
        self.ring
    }

    pub const fn index(self) -> u8 {
        self.index
    }

    /// Flat slot of this position (`ring * 8 + index`)
    pub const fn to_index(self) -> usize {
        self.ring as usize * POINTS_PER_RING as usize + self.index as usize
    }

    /// Corners never connect to another ring
    pub const fn is_corner(self) -> bool {
        self.index % 2 == 0
    }

    /// All 24 positions in slot order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..NUM_POSITIONS).map(Position::from_index)
    }

    /// Mills this position belongs to
    pub fn mills(self) -> &'static [Mill] {
        TOPOLOGY.mills_of(self)
    }

    /// Positions adjacent to this one
    pub fn neighbours(self) -> &'static [Position] {
        TOPOLOGY.neighbours_of(self)
    }

    pub fn is_neighbour(self, other: Position) -> bool {
        self.neighbours().contains(&other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.ring, self.index)
    }
}

impl TryFrom<(u8, u8)> for Position {
    type Error = BoardError;

    fn try_from((ring, index): (u8, u8)) -> Result<Self, Self::Error> {
        Position::try_new(ring, index)
    }
}

impl From<Position> for (u8, u8) {
    fn from(p: Position) -> Self {
        (p.ring, p.index)
    }
}

/// Three positions in a line; owning all three forms the mill
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mill([Position; 3]);

impl Mill {
    pub const fn new(a: Position, b: Position, c: Position) -> Self {
        Self([a, b, c])
    }

    pub fn positions(&self) -> &[Position; 3] {
        &self.0
    }

    pub fn contains(&self, p: Position) -> bool {
        self.0.contains(&p)
    }
}

impl fmt::Display for Mill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Precomputed mills and adjacency for every position
pub struct Topology {
    mills: [Mill; NUM_MILLS],
    mills_of: [[Mill; MAX_MILLS_PER_POSITION]; NUM_POSITIONS],
    mill_counts: [u8; NUM_POSITIONS],
    neighbours: [[Position; MAX_NEIGHBOURS]; NUM_POSITIONS],
    neighbour_counts: [u8; NUM_POSITIONS],
}

/// The board topology, built at compile time
pub static TOPOLOGY: Topology = Topology::build();

impl Topology {
    const fn build() -> Self {
        const ORIGIN: Position = Position::new(0, 0);
        const PLACEHOLDER: Mill = Mill::new(ORIGIN, ORIGIN, ORIGIN);

        let mut mills = [PLACEHOLDER; NUM_MILLS];
        let mut count = 0;

        // Ring mills: corner, midpoint, next corner
        let mut ring = 0;
        while ring < RINGS {
            let mut j = 0;
            while j < POINTS_PER_RING {
                mills[count] = Mill::new(
                    Position::new(ring, j),
                    Position::new(ring, j + 1),
                    Position::new(ring, (j + 2) % POINTS_PER_RING),
                );
                count += 1;
                j += 2;
            }
            ring += 1;
        }

        // Spoke mills: the same midpoint on all three rings
        let mut j = 1;
        while j < POINTS_PER_RING {
            mills[count] = Mill::new(Position::new(0, j), Position::new(1, j), Position::new(2, j));
            count += 1;
            j += 2;
        }
        assert!(count == NUM_MILLS);

        let mut mills_of = [[PLACEHOLDER; MAX_MILLS_PER_POSITION]; NUM_POSITIONS];
        let mut mill_counts = [0u8; NUM_POSITIONS];
        let mut m = 0;
        while m < NUM_MILLS {
            let mut k = 0;
            while k < 3 {
                let slot = mills[m].0[k].to_index();
                mills_of[slot][mill_counts[slot] as usize] = mills[m];
                mill_counts[slot] += 1;
                k += 1;
            }
            m += 1;
        }

        let mut neighbours = [[ORIGIN; MAX_NEIGHBOURS]; NUM_POSITIONS];
        let mut neighbour_counts = [0u8; NUM_POSITIONS];
        let mut slot = 0;
        while slot < NUM_POSITIONS {
            let p = Position::from_index(slot);
            let mut n = 0;
            neighbours[slot][n] = Position::new(p.ring, (p.index + 1) % POINTS_PER_RING);
            n += 1;
            neighbours[slot][n] = Position::new(p.ring, (p.index + POINTS_PER_RING - 1) % POINTS_PER_RING);
            n += 1;
            if !p.is_corner() {
                if p.ring > 0 {
                    neighbours[slot][n] = Position::new(p.ring - 1, p.index);
                    n += 1;
                }
                if p.ring + 1 < RINGS {
                    neighbours[slot][n] = Position::new(p.ring + 1, p.index);
                    n += 1;
                }
            }
            neighbour_counts[slot] = n as u8;
            slot += 1;
        }

        Self {
            mills,
            mills_of,
            mill_counts,
            neighbours,
            neighbour_counts,
        }
    }

    /// Every mill on the board
    pub fn mills(&self) -> &[Mill] {
        &self.mills
    }

    /// Mills containing `p` (one for corners, two for midpoints)
    pub fn mills_of(&self, p: Position) -> &[Mill] {
        let slot = p.to_index();
        &self.mills_of[slot][..self.mill_counts[slot] as usize]
    }

    /// Positions adjacent to `p`
    pub fn neighbours_of(&self, p: Position) -> &[Position] {
        let slot = p.to_index();
        &self.neighbours[slot][..self.neighbour_counts[slot] as usize]
    }
}
