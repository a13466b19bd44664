//! Bounded A* over token states.
//!
//! Key points:
//! - g = moves so far, h = Manhattan distance to the goal (admissible and
//!   consistent), f = g + h
//! - Nodes live in an arena indexed by `FxHashMap<State, usize>`; the heap
//!   carries arena indices, so states are cloned once per discovery
//! - Stale heap entries (superseded by a cheaper path) are skipped on pop
//! - With a depth bound, successors with f > bound are never queued, nodes
//!   deeper than the bound are not expanded, and the search aborts as soon
//!   as the cheapest queued f exceeds the bound

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::board::State;
use crate::grid::neighbors;
use crate::heuristic::manhattan;

/// A discovered state and the best known way to reach it.
struct SearchNode {
    state: State,
    parent: Option<usize>,
    g_score: u32,
}

/// Heap entry ordered by f, then by deeper g, then by discovery order.
///
/// Preferring deeper nodes on f ties reaches the goal sooner once the
/// heuristic has become exact.
#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_score: u32,
    g_score: u32,
    sequence: u64,
    node: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: wrap in Reverse for lowest f first
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds an optimal state sequence from `initial` to `goal`, both inclusive.
///
/// Returns `None` when no path exists, or when `max_depth` is given and no
/// path of at most `max_depth` moves exists. A returned path has exactly
/// `optimal distance + 1` states.
pub fn a_star(
    board_size: u8,
    initial: &State,
    goal: &State,
    max_depth: Option<u32>,
) -> Option<Vec<State>> {
    let within_bound = |f_score: u32| max_depth.map_or(true, |bound| f_score <= bound);

    let start_h = manhattan(initial, goal);
    if !within_bound(start_h) {
        return None;
    }

    let mut nodes: Vec<SearchNode> = vec![SearchNode {
        state: initial.clone(),
        parent: None,
        g_score: 0,
    }];
    let mut index: FxHashMap<State, usize> = FxHashMap::default();
    index.insert(initial.clone(), 0);

    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;
    open.push(Reverse(OpenEntry {
        f_score: start_h,
        g_score: 0,
        sequence,
        node: 0,
    }));

    while let Some(Reverse(entry)) = open.pop() {
        let current = entry.node;
        let g_score = nodes[current].g_score;

        // a cheaper path to this node was queued after this entry
        if entry.g_score > g_score {
            continue;
        }

        if nodes[current].state == *goal {
            return Some(reconstruct_path(&nodes, current));
        }

        if let Some(bound) = max_depth {
            // entries pop in f order, so nothing left can finish within the bound
            if entry.f_score > bound {
                return None;
            }
            if g_score > bound {
                continue;
            }
        }

        let tentative_g = g_score + 1;
        for successor in neighbors(&nodes[current].state, board_size) {
            let f_score = tentative_g + manhattan(&successor, goal);

            let node = match index.get(&successor) {
                Some(&known) if nodes[known].g_score <= tentative_g => continue,
                Some(&known) => {
                    nodes[known].g_score = tentative_g;
                    nodes[known].parent = Some(current);
                    known
                }
                None => {
                    let fresh = nodes.len();
                    index.insert(successor.clone(), fresh);
                    nodes.push(SearchNode {
                        state: successor,
                        parent: Some(current),
                        g_score: tentative_g,
                    });
                    fresh
                }
            };

            if within_bound(f_score) {
                sequence += 1;
                open.push(Reverse(OpenEntry {
                    f_score,
                    g_score: tentative_g,
                    sequence,
                    node,
                }));
            }
        }
    }

    None
}

/// Walks parent links back to the root and returns the path root-first.
fn reconstruct_path(nodes: &[SearchNode], goal_node: usize) -> Vec<State> {
    let mut path = Vec::with_capacity(nodes[goal_node].g_score as usize + 1);
    let mut cursor = Some(goal_node);
    while let Some(node) = cursor {
        path.push(nodes[node].state.clone());
        cursor = nodes[node].parent;
    }
    path.reverse();
    path
}

/// Optimal move count between two states, if within `max_depth`.
pub fn shortest_distance(
    board_size: u8,
    initial: &State,
    goal: &State,
    max_depth: Option<u32>,
) -> Option<u32> {
    a_star(board_size, initial, goal, max_depth).map(|path| (path.len() - 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state_of;
    use crate::geometry::move_between;
    use crate::grid::sample_positions;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Exhaustive breadth-first distance, for cross-checking optimality.
    fn bfs_distance(board_size: u8, initial: &State, goal: &State) -> Option<u32> {
        let mut seen: FxHashMap<State, u32> = FxHashMap::default();
        let mut queue = VecDeque::from([initial.clone()]);
        seen.insert(initial.clone(), 0);
        while let Some(state) = queue.pop_front() {
            let depth = seen[&state];
            if state == *goal {
                return Some(depth);
            }
            for successor in neighbors(&state, board_size) {
                if !seen.contains_key(&successor) {
                    seen.insert(successor.clone(), depth + 1);
                    queue.push_back(successor);
                }
            }
        }
        None
    }

    #[test]
    fn test_single_token_across_3x3() {
        let initial = state_of(&[(0, 0)]);
        let goal = state_of(&[(2, 2)]);
        let path = a_star(3, &initial, &goal, None).expect("path must exist");
        assert_eq!(path.len() - 1, 4);
        assert_eq!(manhattan(&initial, &goal), 4);
        assert_eq!(path.first(), Some(&initial));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn test_two_tokens_sliding_in_line() {
        // token 2 has to move first so token 1 can follow it
        let initial = state_of(&[(0, 0), (0, 1)]);
        let goal = state_of(&[(0, 1), (0, 2)]);
        assert_eq!(shortest_distance(3, &initial, &goal, None), Some(2));
    }

    #[test]
    fn test_initial_equals_goal() {
        let state = state_of(&[(1, 1), (0, 0)]);
        let path = a_star(3, &state, &state, Some(0)).unwrap();
        assert_eq!(path, vec![state]);
    }

    #[test]
    fn test_path_steps_are_legal_moves() {
        let initial = state_of(&[(0, 0), (0, 1), (1, 0)]);
        let goal = state_of(&[(1, 1), (0, 0), (0, 1)]);
        let path = a_star(2, &initial, &goal, None).unwrap();
        for pair in path.windows(2) {
            assert!(
                move_between(&pair[0], &pair[1]).is_some(),
                "{:?} -> {:?} is not a single slide",
                pair[0],
                pair[1]
            );
            assert!(pair[1].validate(2).is_ok());
        }
    }

    #[test]
    fn test_depth_bound_rejects_longer_solutions() {
        let initial = state_of(&[(0, 0)]);
        let goal = state_of(&[(2, 2)]);
        assert_eq!(a_star(3, &initial, &goal, Some(3)), None);
        assert_eq!(shortest_distance(3, &initial, &goal, Some(4)), Some(4));
    }

    #[test]
    fn test_depth_bound_with_detour() {
        // swapping two tokens on a 1-wide corridor needs the spare cells
        let initial = state_of(&[(0, 0), (0, 1)]);
        let goal = state_of(&[(0, 1), (0, 0)]);
        let exact = shortest_distance(2, &initial, &goal, None).unwrap();
        assert!(exact > manhattan(&initial, &goal));
        assert_eq!(shortest_distance(2, &initial, &goal, Some(exact - 1)), None);
        assert_eq!(shortest_distance(2, &initial, &goal, Some(exact)), Some(exact));
    }

    #[test]
    fn test_matches_breadth_first_search() {
        let mut rng = SmallRng::seed_from_u64(42);
        for board_size in [2u8, 3] {
            for tokens in 1..=4usize {
                if tokens >= usize::from(board_size * board_size) {
                    continue;
                }
                for _ in 0..15 {
                    let initial = sample_positions(&mut rng, tokens, board_size);
                    let goal = sample_positions(&mut rng, tokens, board_size);
                    let expected = bfs_distance(board_size, &initial, &goal);
                    let found = shortest_distance(board_size, &initial, &goal, None);
                    assert_eq!(found, expected, "{initial:?} -> {goal:?} on {board_size}x{board_size}");

                    // three tokens on a 2x2 ring keep their cyclic order
                    let Some(found) = found else { continue };
                    let h = manhattan(&initial, &goal);
                    assert!(h <= found, "heuristic must be admissible");
                    assert_eq!((found - h) % 2, 0, "detours cost moves in pairs");
                }
            }
        }
    }

    #[test]
    fn test_tile_puzzle_3x3() {
        // goal with the last two tiles swapped back through the blank
        let goal = crate::heuristic::goal_state(8, 3);
        let initial = goal.with_moved(7, crate::board::Position::new(2, 0));
        assert_eq!(shortest_distance(3, &initial, &goal, Some(31)), Some(1));
    }
}
