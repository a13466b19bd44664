//! Stratified generation of benchmark instances.
//!
//! Both variants draw candidates, measure their optimal solution length (c1)
//! and detour (c2), and keep a candidate only if its complexity bin still has
//! room. Every kept instance is written to disk before its bin is counted, so
//! the bin table always matches the files in the output directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace, warn};

use crate::bins::{BinStatus, ComplexityBins};
use crate::board::{State, TokenLabel, TILE_BODY};
use crate::error::GenerateError;
use crate::expand::find_config_by_random_expand;
use crate::geometry::moves_along;
use crate::grid::{sample_positions, tile_color};
use crate::heuristic::{goal_state, is_solvable, manhattan};
use crate::params::{SgpPlan, Stagnation, StagnationPolicy, StpPlan};
use crate::persistence::{ConfigDir, ConfigRecord, InstanceData};
use crate::random_walk::{generate_random_invalid_path, generate_random_valid_path};
use crate::solver::a_star;

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Duplicate,
    OutsideEnvelope,
    NoPathWithinBound,
    OutOfRange,
    BinFull,
    Unsolvable,
    ExpandFailed,
}

/// Per-reason tallies of discarded candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub duplicate: u64,
    pub outside_envelope: u64,
    pub no_path_within_bound: u64,
    pub out_of_range: u64,
    pub bin_full: u64,
    pub unsolvable: u64,
    pub expand_failed: u64,
}

impl RejectionCounts {
    fn record(&mut self, rejection: Rejection) {
        let slot = match rejection {
            Rejection::Duplicate => &mut self.duplicate,
            Rejection::OutsideEnvelope => &mut self.outside_envelope,
            Rejection::NoPathWithinBound => &mut self.no_path_within_bound,
            Rejection::OutOfRange => &mut self.out_of_range,
            Rejection::BinFull => &mut self.bin_full,
            Rejection::Unsolvable => &mut self.unsolvable,
            Rejection::ExpandFailed => &mut self.expand_failed,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.duplicate
            + self.outside_envelope
            + self.no_path_within_bound
            + self.out_of_range
            + self.bin_full
            + self.unsolvable
            + self.expand_failed
    }
}

/// Summary of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub config_id: String,
    pub output_dir: PathBuf,
    pub written: u64,
    pub candidates_checked: u64,
    pub rejections: RejectionCounts,
}

impl GenerationReport {
    fn new(dir: &ConfigDir) -> Self {
        Self {
            config_id: dir.config_id().to_string(),
            output_dir: dir.path().to_path_buf(),
            written: 0,
            candidates_checked: 0,
            rejections: RejectionCounts::default(),
        }
    }

    fn tally(&mut self, outcome: Outcome) {
        self.candidates_checked += 1;
        match outcome {
            Outcome::Accepted => self.written += 1,
            Outcome::Rejected(rejection) => {
                trace!(?rejection, "candidate rejected");
                self.rejections.record(rejection);
            }
        }
    }
}

enum Outcome {
    Accepted,
    Rejected(Rejection),
}

/// Seen `(initial, goal)` pairs, keyed by their byte encoding.
#[derive(Default)]
struct Fingerprints {
    seen: FxHashSet<Box<[u8]>>,
    buffer: Vec<u8>,
}

impl Fingerprints {
    /// Returns `false` if the pair was already present.
    fn insert(&mut self, initial: &State, goal: &State) -> bool {
        self.buffer.clear();
        initial.encode_into(&mut self.buffer);
        goal.encode_into(&mut self.buffer);
        if self.seen.contains(self.buffer.as_slice()) {
            return false;
        }
        self.seen.insert(self.buffer.as_slice().into())
    }
}

/// Wall-clock progress check run once per sampling iteration.
struct Watchdog {
    stagnation: Stagnation,
    last_tick: Instant,
    accepted_at_tick: u64,
}

impl Watchdog {
    fn new(stagnation: Stagnation) -> Self {
        Self {
            stagnation,
            last_tick: Instant::now(),
            accepted_at_tick: 0,
        }
    }

    fn check(&mut self, report: &GenerationReport, target: u64) -> Result<(), GenerateError> {
        if self.last_tick.elapsed() < self.stagnation.interval {
            return Ok(());
        }
        self.last_tick = Instant::now();

        info!(
            accepted = report.written,
            target,
            candidates = report.candidates_checked,
            "generation progress"
        );
        if report.written > self.accepted_at_tick {
            self.accepted_at_tick = report.written;
            return Ok(());
        }

        let interval_secs = self.stagnation.interval.as_secs();
        warn!(
            interval_secs,
            accepted = report.written,
            target,
            "no instance accepted since the last check"
        );
        match self.stagnation.policy {
            StagnationPolicy::Warn => Ok(()),
            StagnationPolicy::Abort => Err(GenerateError::Stagnated {
                interval_secs,
                accepted: report.written,
                target,
            }),
        }
    }
}

/// Fills every `(tokens, c1, c2)` bin of `plan` with random geom instances.
///
/// Initial and goal placements are drawn independently and uniformly; pairs
/// outside the heuristic envelope are dropped before the solver runs.
pub fn generate_sgp_configs<R: Rng + ?Sized>(
    plan: &SgpPlan,
    out_root: &Path,
    rng: &mut R,
) -> Result<GenerationReport, GenerateError> {
    let dir = ConfigDir::create(out_root, "SGP")?;
    let target = plan.target_count();
    info!(
        config_id = dir.config_id(),
        board_size = plan.board_size,
        target,
        "generating sliding-geom configs"
    );

    let mut report = GenerationReport::new(&dir);
    let mut watchdog = Watchdog::new(plan.stagnation);

    for num_tokens in plan.tokens.clone() {
        let mut bins = ComplexityBins::new(plan.c1.clone(), plan.c2.clone(), plan.bin_size);
        let mut seen = Fingerprints::default();

        while !bins.all_full() {
            watchdog.check(&report, target)?;
            let outcome = sample_geom_instance(plan, num_tokens, &dir, &mut bins, &mut seen, rng)?;
            report.tally(outcome);
        }
        info!(num_tokens, written = bins.total(), "token count complete");
    }

    info!(
        written = report.written,
        candidates = report.candidates_checked,
        output_dir = %report.output_dir.display(),
        "sliding-geom generation finished"
    );
    Ok(report)
}

fn sample_geom_instance<R: Rng + ?Sized>(
    plan: &SgpPlan,
    num_tokens: usize,
    dir: &ConfigDir,
    bins: &mut ComplexityBins,
    seen: &mut Fingerprints,
    rng: &mut R,
) -> Result<Outcome, GenerateError> {
    let board_size = plan.board_size;
    let initial = sample_positions(rng, num_tokens, board_size);
    let goal = sample_positions(rng, num_tokens, board_size);

    if !seen.insert(&initial, &goal) {
        return Ok(Outcome::Rejected(Rejection::Duplicate));
    }
    let estimate = manhattan(&initial, &goal);
    if !plan.heuristic_in_envelope(estimate) {
        return Ok(Outcome::Rejected(Rejection::OutsideEnvelope));
    }
    let Some(shortest) = a_star(board_size, &initial, &goal, Some(*plan.c1.end())) else {
        return Ok(Outcome::Rejected(Rejection::NoPathWithinBound));
    };

    let c1 = (shortest.len() - 1) as u32;
    let c2 = (c1 - estimate) / 2;
    match bins.status(c1, c2) {
        BinStatus::OutOfRange => return Ok(Outcome::Rejected(Rejection::OutOfRange)),
        BinStatus::Full => return Ok(Outcome::Rejected(Rejection::BinFull)),
        BinStatus::Open => {}
    }

    let labels: Vec<TokenLabel> = plan
        .labels
        .choose_multiple(rng, num_tokens)
        .cloned()
        .collect();
    let valid = generate_random_valid_path(board_size, &initial, plan.random_path_steps, rng);
    let invalid = generate_random_invalid_path(board_size, &initial, plan.random_path_steps, rng);

    let record = ConfigRecord::encode(
        dir.config_id(),
        &InstanceData {
            board_size,
            initial: &initial,
            goal: &goal,
            labels: &labels,
            c1,
            c2: Some(c2),
            bin_fill: bins.count(c1, c2) + 1,
            shortest: &moves_along(&shortest),
            random_valid: &moves_along(&valid),
            random_invalid: &invalid.attempts,
        },
    );
    let path = dir.write(&record)?;
    bins.increment(c1, c2);
    debug!(file = %path.display(), num_tokens, c1, c2, "instance accepted");

    Ok(Outcome::Accepted)
}

/// Fills every c1 bin of `plan` with sliding-tile instances built backwards
/// from the canonical goal.
pub fn generate_stp_configs<R: Rng + ?Sized>(
    plan: &StpPlan,
    out_root: &Path,
    rng: &mut R,
) -> Result<GenerationReport, GenerateError> {
    let dir = ConfigDir::create(out_root, "STP")?;
    let target = plan.target_count();
    info!(
        config_id = dir.config_id(),
        board_size = plan.board_size,
        target,
        "generating sliding-tile configs"
    );

    let num_tiles = plan.num_tiles();
    let goal = goal_state(num_tiles, plan.board_size);
    let labels: Vec<TokenLabel> = (0..num_tiles)
        .map(|tile| TokenLabel::new(TILE_BODY, tile_color(tile, plan.board_size)))
        .collect();

    let mut report = GenerationReport::new(&dir);
    let mut watchdog = Watchdog::new(plan.stagnation);
    let mut bins = ComplexityBins::new(plan.c1.clone(), None, plan.bin_size);
    let mut seen = Fingerprints::default();

    for target_c1 in plan.c1.clone() {
        while !bins.row_full(target_c1) {
            watchdog.check(&report, target)?;
            let outcome = sample_tile_instance(
                plan, target_c1, &goal, &labels, &dir, &mut bins, &mut seen, rng,
            )?;
            report.tally(outcome);
        }
        info!(c1 = target_c1, written = report.written, "complexity level complete");
    }

    info!(
        written = report.written,
        candidates = report.candidates_checked,
        output_dir = %report.output_dir.display(),
        "sliding-tile generation finished"
    );
    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn sample_tile_instance<R: Rng + ?Sized>(
    plan: &StpPlan,
    target_c1: u32,
    goal: &State,
    labels: &[TokenLabel],
    dir: &ConfigDir,
    bins: &mut ComplexityBins,
    seen: &mut Fingerprints,
    rng: &mut R,
) -> Result<Outcome, GenerateError> {
    let board_size = plan.board_size;
    let Some(initial) =
        find_config_by_random_expand(board_size, goal, target_c1, plan.expand_max_steps, rng)
    else {
        return Ok(Outcome::Rejected(Rejection::ExpandFailed));
    };
    if !is_solvable(&initial, board_size) {
        return Ok(Outcome::Rejected(Rejection::Unsolvable));
    }
    if !seen.insert(&initial, goal) {
        return Ok(Outcome::Rejected(Rejection::Duplicate));
    }
    let Some(shortest) = a_star(board_size, &initial, goal, Some(plan.solve_depth)) else {
        return Ok(Outcome::Rejected(Rejection::NoPathWithinBound));
    };

    // the re-solved length is authoritative, even if it misses target_c1
    let c1 = (shortest.len() - 1) as u32;
    match bins.status(c1, 0) {
        BinStatus::OutOfRange => return Ok(Outcome::Rejected(Rejection::OutOfRange)),
        BinStatus::Full => return Ok(Outcome::Rejected(Rejection::BinFull)),
        BinStatus::Open => {}
    }

    let valid = generate_random_valid_path(board_size, &initial, plan.random_path_steps, rng);
    let invalid = generate_random_invalid_path(board_size, &initial, plan.random_path_steps, rng);

    let record = ConfigRecord::encode(
        dir.config_id(),
        &InstanceData {
            board_size,
            initial: &initial,
            goal,
            labels,
            c1,
            c2: None,
            bin_fill: bins.count(c1, 0) + 1,
            shortest: &moves_along(&shortest),
            random_valid: &moves_along(&valid),
            random_invalid: &invalid.attempts,
        },
    );
    let path = dir.write(&record)?;
    bins.increment(c1, 0);
    debug!(file = %path.display(), c1, "instance accepted");

    Ok(Outcome::Accepted)
}
