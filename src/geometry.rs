//! Move directions and move extraction from state sequences.
//!
//! Direction words follow the renderer's axis convention: the first
//! coordinate runs left/right and the second runs down/up.

use crate::board::State;

/// One unit step along a board axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

/// All four directions, in the order successors are generated.
///
/// Ordering note: `grid::neighbors` and the random walkers iterate this
/// table, so seeded runs depend on it staying fixed.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Left,  // (-1, 0)
    Direction::Right, // (1, 0)
    Direction::Down,  // (0, -1)
    Direction::Up,    // (0, 1)
];

impl Direction {
    /// `(row, col)` offset of this direction.
    #[inline(always)]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Up => (0, 1),
        }
    }

    pub const fn from_delta(d_row: i16, d_col: i16) -> Option<Self> {
        match (d_row, d_col) {
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Down),
            (0, 1) => Some(Direction::Up),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token slide. `token` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub token: usize,
    pub direction: Direction,
}

/// The move that turns `from` into `to`, if they differ by exactly one unit slide.
pub fn move_between(from: &State, to: &State) -> Option<Move> {
    if from.len() != to.len() {
        return None;
    }
    let mut changed = from
        .positions()
        .iter()
        .zip(to.positions())
        .enumerate()
        .filter(|(_, (before, after))| before != after);

    let (token, (before, after)) = changed.next()?;
    if changed.next().is_some() {
        return None;
    }
    let direction = Direction::from_delta(
        i16::from(after.row) - i16::from(before.row),
        i16::from(after.col) - i16::from(before.col),
    )?;
    Some(Move { token, direction })
}

/// Moves along a state path. Repeated states (rejected attempts) yield no move.
pub fn moves_along(path: &[State]) -> Vec<Move> {
    path.windows(2)
        .filter_map(|pair| move_between(&pair[0], &pair[1]))
        .collect()
}
