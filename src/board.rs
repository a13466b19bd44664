//! Board coordinates, token states and token labels.
//!
//! A state lists one position per token, indexed by the token's stable
//! number (`geom_nr - 1`). Cells not listed in the state are free.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::GenerateError;
use crate::geometry::Direction;

/// Largest board edge the generator accepts.
pub const MAX_BOARD_SIZE: u8 = 16;

/// Token count kept inline before a state spills to the heap (a full 5x5 tile board).
const INLINE_TOKENS: usize = 24;

/// A cell on the board, serialized as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major cell index.
    #[inline(always)]
    pub const fn index(self, board_size: u8) -> usize {
        self.row as usize * board_size as usize + self.col as usize
    }

    /// Inverse of [`Position::index`].
    #[inline(always)]
    pub const fn from_index(cell_index: usize, board_size: u8) -> Self {
        Self {
            row: (cell_index / board_size as usize) as u8,
            col: (cell_index % board_size as usize) as u8,
        }
    }

    /// The adjacent cell in `direction`, or `None` if it falls off the board.
    #[inline]
    pub fn step(self, direction: Direction, board_size: u8) -> Option<Self> {
        let (d_row, d_col) = direction.delta();
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row < board_size && col < board_size).then_some(Self { row, col })
    }

    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }
}

impl From<[u8; 2]> for Position {
    fn from([row, col]: [u8; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Position> for [u8; 2] {
    fn from(position: Position) -> Self {
        [position.row, position.col]
    }
}

/// Token positions at one point in time, serialized as `[[row, col], ...]`.
///
/// Structural equality and hashing make a state usable directly as a
/// search-map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<Position>", into = "Vec<Position>")]
pub struct State(SmallVec<[Position; INLINE_TOKENS]>);

impl State {
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Self {
        Self(positions.into_iter().collect())
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of token `token` (0-based).
    pub fn get(&self, token: usize) -> Position {
        self.0[token]
    }

    /// Copy of this state with one token relocated.
    pub fn with_moved(&self, token: usize, to: Position) -> Self {
        let mut moved = self.clone();
        moved.0[token] = to;
        moved
    }

    pub fn occupied(&self) -> FxHashSet<Position> {
        self.0.iter().copied().collect()
    }

    /// Checks the board invariants: every token on the board, no shared cells.
    pub fn validate(&self, board_size: u8) -> Result<(), GenerateError> {
        let mut seen = FxHashSet::default();
        for (token, &position) in self.0.iter().enumerate() {
            if position.row >= board_size || position.col >= board_size {
                return Err(GenerateError::invalid(format!(
                    "token {} at [{}, {}] lies outside a {board_size}x{board_size} board",
                    token + 1,
                    position.row,
                    position.col
                )));
            }
            if !seen.insert(position) {
                return Err(GenerateError::invalid(format!(
                    "token {} shares cell [{}, {}] with another token",
                    token + 1,
                    position.row,
                    position.col
                )));
            }
        }
        Ok(())
    }

    /// Compact lossless encoding: two bytes per token.
    pub fn encode_into(&self, buffer: &mut Vec<u8>) {
        for position in &self.0 {
            buffer.push(position.row);
            buffer.push(position.col);
        }
    }
}

impl From<Vec<Position>> for State {
    fn from(positions: Vec<Position>) -> Self {
        Self(SmallVec::from_vec(positions))
    }
}

impl From<State> for Vec<Position> {
    fn from(state: State) -> Self {
        state.0.into_vec()
    }
}

impl FromIterator<Position> for State {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a state from `(row, col)` pairs. Mostly useful in tests and benches.
pub fn state_of(cells: &[(u8, u8)]) -> State {
    cells.iter().map(|&(row, col)| Position::new(row, col)).collect()
}

/// Visual identity of a token as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenLabel {
    /// Shape name, or `"tile"` for the sliding-tile variant.
    pub body: String,
    pub color: String,
}

impl TokenLabel {
    pub fn new(body: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            color: color.into(),
        }
    }

    pub fn is_tile(&self) -> bool {
        self.body == TILE_BODY
    }
}

/// Body name used for every token of the sliding-tile variant.
pub const TILE_BODY: &str = "tile";

/// All `(shape, color)` labels, shape-major.
pub fn label_pool(shapes: &[String], colors: &[String]) -> Vec<TokenLabel> {
    shapes
        .iter()
        .flat_map(|shape| colors.iter().map(move |color| TokenLabel::new(shape, color)))
        .collect()
}
