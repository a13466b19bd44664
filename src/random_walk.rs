//! Random move traces handed to agents as positive and negative examples.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::State;
use crate::geometry::{Move, DIRECTIONS};
use crate::grid::neighbors;

/// A walk of `max_steps` uniformly random legal moves, starting state included.
///
/// Stops early only if the current state has no legal move at all.
pub fn generate_random_valid_path<R: Rng + ?Sized>(
    board_size: u8,
    initial: &State,
    max_steps: usize,
    rng: &mut R,
) -> Vec<State> {
    let mut path = Vec::with_capacity(max_steps + 1);
    let mut current = initial.clone();
    path.push(current.clone());

    for _ in 0..max_steps {
        let successors = neighbors(&current, board_size);
        let Some(next) = successors.choose(rng) else {
            break;
        };
        current = next.clone();
        path.push(current.clone());
    }

    path
}

/// A trace of random move attempts, legal or not.
///
/// `states[i + 1]` is the board after `attempts[i]`: the moved state when the
/// attempt was legal, otherwise an unchanged copy of `states[i]`.
#[derive(Debug, Clone)]
pub struct InvalidPath {
    pub states: Vec<State>,
    pub attempts: Vec<Move>,
}

/// Picks a random token and direction `max_steps` times, committing only legal moves.
///
/// Every attempt is recorded, so the trace contains off-board and blocked
/// moves alongside legal ones.
pub fn generate_random_invalid_path<R: Rng + ?Sized>(
    board_size: u8,
    initial: &State,
    max_steps: usize,
    rng: &mut R,
) -> InvalidPath {
    let mut states = Vec::with_capacity(max_steps + 1);
    let mut attempts = Vec::with_capacity(max_steps);
    let mut current = initial.clone();
    states.push(current.clone());

    if initial.is_empty() {
        return InvalidPath { states, attempts };
    }

    for _ in 0..max_steps {
        let token = rng.gen_range(0..current.len());
        let direction = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];

        let target = current
            .get(token)
            .step(direction, board_size)
            .filter(|target| !current.positions().contains(target));
        if let Some(target) = target {
            current = current.with_moved(token, target);
        }

        attempts.push(Move { token, direction });
        states.push(current.clone());
    }

    InvalidPath { states, attempts }
}
