//! Benchmarks for the solver and instance construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use slidegen::board::{state_of, State};
use slidegen::expand::find_config_by_random_expand;
use slidegen::grid::neighbors;
use slidegen::heuristic::{goal_state, manhattan};
use slidegen::solver::a_star;

/// Benchmark solving an 8-puzzle instance 14 moves from the goal.
fn bench_a_star_tiles(c: &mut Criterion) {
    let goal = goal_state(8, 3);
    let mut rng = SmallRng::seed_from_u64(42);
    let initial = loop {
        if let Some(found) = find_config_by_random_expand(3, &goal, 14, 1000, &mut rng) {
            break found;
        }
    };

    c.bench_function("a_star_8_puzzle", |b| {
        b.iter(|| a_star(3, black_box(&initial), black_box(&goal), Some(24)))
    });
}

/// Benchmark solving a crowded 5x5 geom instance.
fn bench_a_star_geoms(c: &mut Criterion) {
    let initial = state_of(&[(0, 0), (0, 1), (1, 0), (2, 2), (4, 4), (3, 1), (1, 3), (4, 0)]);
    let goal = state_of(&[(2, 0), (0, 3), (1, 2), (2, 4), (4, 2), (3, 3), (0, 4), (4, 1)]);

    let mut group = c.benchmark_group("geoms");
    group.sample_size(20);
    group.bench_function("a_star_5x5_8_tokens", |b| {
        b.iter(|| a_star(5, black_box(&initial), black_box(&goal), Some(30)))
    });
    group.finish();
}

/// Benchmark neighbor generation on a half-full 5x5 board.
fn bench_neighbors(c: &mut Criterion) {
    let state = goal_state(12, 5);

    c.bench_function("neighbors_5x5", |b| b.iter(|| neighbors(black_box(&state), 5)));
}

/// Benchmark the Manhattan estimate for a full 6x6 tile board.
fn bench_manhattan(c: &mut Criterion) {
    let goal = goal_state(35, 6);
    let initial: State = goal.positions().iter().rev().copied().collect();

    c.bench_function("manhattan_6x6", |b| {
        b.iter(|| manhattan(black_box(&initial), black_box(&goal)))
    });
}

/// Benchmark backward construction of a 3x3 tile instance.
fn bench_random_expand(c: &mut Criterion) {
    let goal = goal_state(8, 3);
    let mut rng = SmallRng::seed_from_u64(7);

    let mut group = c.benchmark_group("expand");
    group.sample_size(20);
    group.bench_function("random_expand_8_puzzle_10", |b| {
        b.iter(|| find_config_by_random_expand(3, black_box(&goal), 10, 1000, &mut rng))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_a_star_tiles,
    bench_a_star_geoms,
    bench_neighbors,
    bench_manhattan,
    bench_random_expand
);
criterion_main!(benches);
