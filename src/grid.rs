//! Board-level operations on token states.
//!
//! Cells are addressed row-major (`idx = row * n + col`). Free cells are the
//! cells not listed in a state; there is no explicit blank marker.

use rand::seq::index;
use rand::Rng;

use crate::board::{Position, State};
use crate::geometry::DIRECTIONS;

/// Every successor of `state`: one token slid one cell into a free neighbor.
///
/// Successors are produced token by token, in `DIRECTIONS` order.
pub fn neighbors(state: &State, board_size: u8) -> Vec<State> {
    let occupied = state.occupied();
    let mut successors = Vec::with_capacity(state.len() * 2);

    for (token, &position) in state.positions().iter().enumerate() {
        for direction in DIRECTIONS {
            if let Some(target) = position.step(direction, board_size) {
                if !occupied.contains(&target) {
                    successors.push(state.with_moved(token, target));
                }
            }
        }
    }

    successors
}

/// All board cells not covered by `state`, in row-major order.
pub fn free_cells(state: &State, board_size: u8) -> Vec<Position> {
    let occupied = state.occupied();
    (0..usize::from(board_size) * usize::from(board_size))
        .map(|idx| Position::from_index(idx, board_size))
        .filter(|position| !occupied.contains(position))
        .collect()
}

/// Draws `count` distinct cells uniformly at random.
pub fn sample_positions<R: Rng + ?Sized>(rng: &mut R, count: usize, board_size: u8) -> State {
    let cells = usize::from(board_size) * usize::from(board_size);
    index::sample(rng, cells, count)
        .into_iter()
        .map(|idx| Position::from_index(idx, board_size))
        .collect()
}

/// Renders a state as a character grid, one row per line.
///
/// Tokens show their 1-based number (hex-style letters from 10 upward);
/// free cells show as '.'.
pub fn format_state(state: &State, board_size: u8) -> String {
    let size = usize::from(board_size);
    let mut cells = vec![0usize; size * size];
    for (token, position) in state.positions().iter().enumerate() {
        cells[position.index(board_size)] = token + 1;
    }

    let mut output = String::with_capacity(size * (size + 1));
    for row in cells.chunks(size) {
        for &token_number in row {
            let display_char = match token_number {
                0 => '.',
                1..=9 => char::from(b'0' + token_number as u8),
                10..=35 => char::from(b'A' + (token_number - 10) as u8),
                _ => '#',
            };
            output.push(display_char);
        }
        output.push('\n');
    }

    output
}

/// Ring color of tile `tile_index` (0-based, laid out row-major).
///
/// 3x3: center red. 4x4: inner 2x2 red. 5x5: outer ring green, middle ring
/// red, center blue. Larger boards: outer ring green, center blue, inner
/// rings red.
pub fn tile_color(tile_index: usize, board_size: u8) -> &'static str {
    let size = usize::from(board_size);
    let row = tile_index / size;
    let col = tile_index % size;
    let depth = row.min(col).min(size - 1 - row).min(size - 1 - col);

    match board_size {
        3 => {
            if tile_index == 4 {
                "red"
            } else {
                "green"
            }
        }
        4 => {
            if (1..=2).contains(&row) && (1..=2).contains(&col) {
                "red"
            } else {
                "green"
            }
        }
        5 => match depth {
            0 => "green",
            1 => "red",
            _ => "blue",
        },
        _ => {
            if depth == 0 {
                "green"
            } else if depth == size / 2 {
                "blue"
            } else if depth < size / 2 {
                "red"
            } else {
                "green"
            }
        }
    }
}
