//! Manhattan lower bound and sliding-tile solvability.
//!
//! Each move shifts one token by one cell, so the summed per-token Manhattan
//! distance never overestimates the remaining move count.

use crate::board::{Position, State};
use crate::grid::free_cells;

/// Sum of per-token Manhattan distances. Tokens are paired by index.
pub fn manhattan(initial: &State, goal: &State) -> u32 {
    debug_assert_eq!(
        initial.len(),
        goal.len(),
        "initial and goal states must list the same tokens"
    );
    initial
        .positions()
        .iter()
        .zip(goal.positions())
        .map(|(&from, &to)| from.manhattan(to))
        .sum()
}

/// Canonical tile goal: columns right to left, each filled top to bottom.
///
/// For a full tile board (`n * n - 1` tokens) this leaves the blank in the
/// bottom-left corner.
pub fn goal_state(num_tokens: usize, board_size: u8) -> State {
    (0..board_size)
        .rev()
        .flat_map(|col| (0..board_size).map(move |row| Position::new(row, col)))
        .take(num_tokens)
        .collect()
}

/// Pairs of tokens whose numbering order disagrees with their row-major cell order.
pub fn count_inversions(state: &State, board_size: u8) -> usize {
    let cells: Vec<usize> = state
        .positions()
        .iter()
        .map(|position| position.index(board_size))
        .collect();

    cells
        .iter()
        .enumerate()
        .map(|(i, &cell)| cells[i + 1..].iter().filter(|&&later| cell > later).count())
        .sum()
}

/// Row of the single free cell, counted from the bottom starting at 1.
///
/// Returns `None` unless exactly one cell is free.
pub fn blank_row_from_bottom(state: &State, board_size: u8) -> Option<usize> {
    match free_cells(state, board_size).as_slice() {
        [blank] => Some(usize::from(board_size) - usize::from(blank.row)),
        _ => None,
    }
}

/// Parity of the quantity a move can never change.
///
/// Odd boards: a horizontal slide keeps the inversion count, a vertical one
/// passes `n - 1` (even) tokens. Even boards: a vertical slide flips the
/// inversion parity and the blank row together.
fn permutation_parity(state: &State, board_size: u8) -> Option<usize> {
    let inversions = count_inversions(state, board_size);
    if board_size % 2 == 1 {
        Some(inversions % 2)
    } else {
        let blank_row = blank_row_from_bottom(state, board_size)?;
        Some((inversions + blank_row) % 2)
    }
}

/// Whether a full tile board (exactly one blank) can reach the canonical
/// [`goal_state`].
///
/// Returns `false` for states that are not single-blank tile boards.
pub fn is_solvable(state: &State, board_size: u8) -> bool {
    let tiles = usize::from(board_size) * usize::from(board_size) - 1;
    if state.len() != tiles {
        return false;
    }
    let goal = goal_state(tiles, board_size);
    match (
        permutation_parity(state, board_size),
        permutation_parity(&goal, board_size),
    ) {
        (Some(parity), Some(goal_parity)) => parity == goal_parity,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state_of;
    use crate::grid::neighbors;

    #[test]
    fn test_manhattan_single_token_across_board() {
        assert_eq!(manhattan(&state_of(&[(0, 0)]), &state_of(&[(2, 2)])), 4);
    }

    #[test]
    fn test_manhattan_pairs_by_index() {
        // swapped tokens are far apart even though the cell sets match
        let initial = state_of(&[(0, 0), (0, 2)]);
        let goal = state_of(&[(0, 2), (0, 0)]);
        assert_eq!(manhattan(&initial, &goal), 4);
    }

    #[test]
    fn test_goal_state_layout_3x3() {
        let goal = goal_state(8, 3);
        assert_eq!(
            goal,
            state_of(&[
                (0, 2),
                (1, 2),
                (2, 2),
                (0, 1),
                (1, 1),
                (2, 1),
                (0, 0),
                (1, 0)
            ])
        );
        assert_eq!(blank_row_from_bottom(&goal, 3), Some(1));
    }

    #[test]
    fn test_goal_states_are_solvable() {
        for board_size in 2..=6u8 {
            let tiles = usize::from(board_size * board_size) - 1;
            assert!(
                is_solvable(&goal_state(tiles, board_size), board_size),
                "goal for {board_size}x{board_size} must be solvable"
            );
        }
    }

    #[test]
    fn test_single_swap_is_unsolvable() {
        for board_size in 2..=5u8 {
            let tiles = usize::from(board_size * board_size) - 1;
            let goal = goal_state(tiles, board_size);
            let swapped = goal.with_moved(0, goal.get(1)).with_moved(1, goal.get(0));
            assert!(
                !is_solvable(&swapped, board_size),
                "swapping two tiles on {board_size}x{board_size} must flip solvability"
            );
        }
    }

    #[test]
    fn test_solvability_preserved_by_moves() {
        for board_size in [3u8, 4] {
            let tiles = usize::from(board_size * board_size) - 1;
            let mut frontier = vec![goal_state(tiles, board_size)];
            for _ in 0..4 {
                frontier = frontier
                    .iter()
                    .flat_map(|state| neighbors(state, board_size))
                    .collect();
                for state in &frontier {
                    assert!(is_solvable(state, board_size));
                }
            }
        }
    }

    #[test]
    fn test_partial_boards_are_not_tile_boards() {
        assert!(!is_solvable(&state_of(&[(0, 0)]), 3));
    }
}
