//! Backward construction of instances at an exact optimal distance.
//!
//! Starting from the goal, the walk only ever moves to a neighbor whose
//! solver-verified distance to the goal is strictly larger, so the distance
//! grows by exactly one per accepted step and never shrinks.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::State;
use crate::grid::neighbors;
use crate::solver::shortest_distance;

/// Walks away from `goal` until the optimal distance back is exactly `path_length`.
///
/// Each of the `max_steps` attempts shuffles the neighbors of the current
/// state and takes the first one that is provably farther from the goal; an
/// attempt that finds none leaves the walk in place. Returns `None` when the
/// step budget runs out first, which callers treat as "try again".
pub fn find_config_by_random_expand<R: Rng + ?Sized>(
    board_size: u8,
    goal: &State,
    path_length: u32,
    max_steps: usize,
    rng: &mut R,
) -> Option<State> {
    if path_length == 0 {
        return Some(goal.clone());
    }

    let mut current = goal.clone();
    let mut current_distance = 0;

    for _ in 0..max_steps {
        let mut candidates = neighbors(&current, board_size);
        candidates.shuffle(rng);

        let farther = candidates.into_iter().find_map(|candidate| {
            shortest_distance(board_size, &candidate, goal, Some(path_length))
                .filter(|&distance| distance > current_distance)
                .map(|distance| (candidate, distance))
        });

        if let Some((next, distance)) = farther {
            current = next;
            current_distance = distance;
        }

        if current_distance == path_length {
            return Some(current);
        }
    }

    None
}
