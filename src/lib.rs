//! Sliding Puzzle Benchmark Generator
//!
//! Builds stratified sets of sliding-geom (many tokens, many blanks) and
//! sliding-tile (one blank) puzzle instances whose optimal solution length
//! and detour are verified by an exact solver, and writes one JSON config per
//! instance for a downstream renderer.

pub mod bins;
pub mod board;
pub mod error;
pub mod expand;
pub mod geometry;
pub mod grid;
pub mod heuristic;
pub mod params;
pub mod persistence;
pub mod random_walk;
pub mod sampler;
pub mod solver;

use std::path::Path;

use rand::RngCore;

use error::GenerateError;
use params::{GeneratorParams, SgpPlan, StpPlan};
use sampler::GenerationReport;

/// Object-safe view of a validated generation plan.
///
/// Lets the CLI pick the variant at runtime and drive either plan through
/// one code path.
pub trait PuzzleVariant {
    /// Short variant name, also the config-id prefix.
    fn name(&self) -> &'static str;
    fn board_size(&self) -> u8;
    /// Number of instances a complete run writes.
    fn target_count(&self) -> u64;
    fn generate(
        &self,
        out_root: &Path,
        rng: &mut dyn RngCore,
    ) -> Result<GenerationReport, GenerateError>;
}

impl PuzzleVariant for SgpPlan {
    fn name(&self) -> &'static str {
        "SGP"
    }

    fn board_size(&self) -> u8 {
        self.board_size
    }

    fn target_count(&self) -> u64 {
        SgpPlan::target_count(self)
    }

    fn generate(
        &self,
        out_root: &Path,
        rng: &mut dyn RngCore,
    ) -> Result<GenerationReport, GenerateError> {
        sampler::generate_sgp_configs(self, out_root, rng)
    }
}

impl PuzzleVariant for StpPlan {
    fn name(&self) -> &'static str {
        "STP"
    }

    fn board_size(&self) -> u8 {
        self.board_size
    }

    fn target_count(&self) -> u64 {
        StpPlan::target_count(self)
    }

    fn generate(
        &self,
        out_root: &Path,
        rng: &mut dyn RngCore,
    ) -> Result<GenerationReport, GenerateError> {
        sampler::generate_stp_configs(self, out_root, rng)
    }
}

/// Validates `params` into the plan for the requested variant.
pub fn plan_for(
    tiles: bool,
    params: &GeneratorParams,
) -> Result<Box<dyn PuzzleVariant>, GenerateError> {
    Ok(if tiles {
        Box::new(StpPlan::from_params(params)?)
    } else {
        Box::new(SgpPlan::from_params(params)?)
    })
}
