//! Generator parameters and their validation.
//!
//! A parameter file is deserialized into [`GeneratorParams`] (every field
//! optional, with defaults), then checked once into an immutable plan
//! ([`SgpPlan`] or [`StpPlan`]) before any sampling starts.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{label_pool, TokenLabel, MAX_BOARD_SIZE};
use crate::error::GenerateError;

/// Largest board the tile variant will try to solve optimally.
pub const MAX_TILE_BOARD_SIZE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: u32,
    pub max: u32,
}

/// One complexity axis as written in the parameter file.
///
/// `{}` or an absent axis means "unconstrained".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl AxisParams {
    pub const fn bounded(min: u32, max: u32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityParams {
    #[serde(default)]
    pub c1: AxisParams,
    #[serde(default)]
    pub c2: AxisParams,
}

impl Default for ComplexityParams {
    fn default() -> Self {
        Self {
            c1: AxisParams::bounded(16, 16),
            c2: AxisParams::bounded(0, 0),
        }
    }
}

/// A validated complexity axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisConstraint {
    Bounded { min: u32, max: u32 },
    Unconstrained,
}

impl AxisConstraint {
    fn parse(name: &str, axis: AxisParams) -> Result<Self, GenerateError> {
        match (axis.min, axis.max) {
            (None, None) => Ok(Self::Unconstrained),
            (Some(min), Some(max)) if min <= max => Ok(Self::Bounded { min, max }),
            (Some(min), Some(max)) => Err(GenerateError::invalid(format!(
                "{name} range is empty: min {min} > max {max}"
            ))),
            _ => Err(GenerateError::invalid(format!(
                "{name} range needs both min and max, or neither"
            ))),
        }
    }

    pub fn range(self) -> Option<RangeInclusive<u32>> {
        match self {
            Self::Bounded { min, max } => Some(min..=max),
            Self::Unconstrained => None,
        }
    }
}

/// What the sampler does when a watchdog tick sees no new instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagnationPolicy {
    /// Log a warning and keep sampling.
    #[default]
    Warn,
    /// Stop generation with [`GenerateError::Stagnated`].
    Abort,
}

/// Raw generator parameters, as loaded from a JSON parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub board_size: u8,
    pub num_geoms_min_max: MinMax,
    pub complexity_min_max: ComplexityParams,
    pub complexity_bin_size: u32,
    pub shapes: Vec<String>,
    pub colors: Vec<String>,
    /// Watchdog period in seconds; defaults to 60 (geoms) or 20 (tiles).
    pub interval: Option<u64>,
    pub seed: Option<u64>,
    /// Length of the random valid/invalid example traces.
    pub random_path_steps: usize,
    /// Step budget of one backward-construction walk.
    pub expand_max_steps: usize,
    pub on_stagnation: StagnationPolicy,
    /// Extra solver depth when re-solving tile instances.
    pub stp_depth_slack: u32,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            board_size: 5,
            num_geoms_min_max: MinMax { min: 8, max: 8 },
            complexity_min_max: ComplexityParams::default(),
            complexity_bin_size: 1,
            shapes: ["sphere", "cylinder", "cone"].map(String::from).to_vec(),
            colors: ["red", "green", "blue"].map(String::from).to_vec(),
            interval: None,
            seed: None,
            random_path_steps: 100,
            expand_max_steps: 1000,
            on_stagnation: StagnationPolicy::Warn,
            stp_depth_slack: 10,
        }
    }
}

impl GeneratorParams {
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let text = fs::read_to_string(path).map_err(GenerateError::io(path))?;
        serde_json::from_str(&text).map_err(GenerateError::json(path))
    }
}

/// Watchdog settings shared by both generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagnation {
    pub interval: Duration,
    pub policy: StagnationPolicy,
}

/// Validated plan for the sliding-geom variant.
#[derive(Debug, Clone)]
pub struct SgpPlan {
    pub board_size: u8,
    pub tokens: RangeInclusive<usize>,
    pub c1: RangeInclusive<u32>,
    /// `None` when c2 is unconstrained: bins are then keyed by c1 alone.
    pub c2: Option<RangeInclusive<u32>>,
    pub bin_size: u32,
    pub labels: Vec<TokenLabel>,
    pub random_path_steps: usize,
    pub stagnation: Stagnation,
}

impl SgpPlan {
    pub fn from_params(params: &GeneratorParams) -> Result<Self, GenerateError> {
        let board_size = check_board_size(params.board_size, MAX_BOARD_SIZE)?;
        let cells = usize::from(board_size) * usize::from(board_size);
        let (c1, c2) = check_complexity(&params.complexity_min_max)?;
        let bin_size = check_bin_size(params.complexity_bin_size)?;

        let MinMax { min, max } = params.num_geoms_min_max;
        if min == 0 || min > max {
            return Err(GenerateError::invalid(format!(
                "num_geoms_min_max must satisfy 1 <= min <= max, got {min}..{max}"
            )));
        }
        let tokens = min as usize..=max as usize;
        if *tokens.end() > cells {
            return Err(GenerateError::invalid(format!(
                "{} geoms do not fit on a {board_size}x{board_size} board",
                tokens.end()
            )));
        }

        // a detour of c2 costs 2 * c2 extra moves on top of a Manhattan distance of at least 1
        if let Some(max_detour) = c2.as_ref().map(|axis| *axis.end()).filter(|&c2| c2 > 0) {
            if *tokens.start() == 1 {
                return Err(GenerateError::invalid(format!(
                    "c2 up to {max_detour} cannot be filled with 1 geom: a lone geom never detours"
                )));
            }
            let shortest_detoured = 2 * max_detour + 1;
            if *c1.start() < shortest_detoured {
                return Err(GenerateError::invalid(format!(
                    "bin (c1 {}, c2 {max_detour}) is unreachable: c2 {max_detour} needs c1 >= {shortest_detoured}",
                    c1.start()
                )));
            }
        }

        let labels = label_pool(&params.shapes, &params.colors);
        if *tokens.end() > labels.len() {
            return Err(GenerateError::invalid(format!(
                "{} geoms need distinct labels but shapes x colors only yields {}",
                tokens.end(),
                labels.len()
            )));
        }

        let capacity = binomial((min as usize + cells - 1) as u64, u64::from(min));
        if capacity < u128::from(bin_size) {
            return Err(GenerateError::invalid(format!(
                "bin size ({bin_size}) exceeds the {capacity} board state combinations available"
            )));
        }

        Ok(Self {
            board_size,
            tokens,
            c1,
            c2,
            bin_size,
            labels,
            random_path_steps: params.random_path_steps,
            stagnation: Stagnation {
                interval: Duration::from_secs(params.interval.unwrap_or(60)),
                policy: params.on_stagnation,
            },
        })
    }

    /// Instances the plan asks for across all token counts.
    pub fn target_count(&self) -> u64 {
        let c2_cells = self.c2.as_ref().map_or(1, |axis| axis.clone().count() as u64);
        let per_token_count = self.c1.clone().count() as u64 * c2_cells * u64::from(self.bin_size);
        self.tokens.clone().count() as u64 * per_token_count
    }

    /// Cheap pre-filter: can a pair with this Manhattan distance land in any bin?
    pub fn heuristic_in_envelope(&self, manhattan: u32) -> bool {
        if manhattan > *self.c1.end() {
            return false;
        }
        match &self.c2 {
            Some(c2) => manhattan + 2 * c2.end() >= *self.c1.start(),
            None => true,
        }
    }
}

/// Validated plan for the sliding-tile variant.
#[derive(Debug, Clone)]
pub struct StpPlan {
    pub board_size: u8,
    pub c1: RangeInclusive<u32>,
    pub bin_size: u32,
    pub random_path_steps: usize,
    pub expand_max_steps: usize,
    /// Depth bound used when re-solving constructed instances.
    pub solve_depth: u32,
    pub stagnation: Stagnation,
}

impl StpPlan {
    pub fn from_params(params: &GeneratorParams) -> Result<Self, GenerateError> {
        let board_size = check_board_size(params.board_size, MAX_TILE_BOARD_SIZE)?;
        let (c1, _) = check_complexity(&params.complexity_min_max)?;
        let bin_size = check_bin_size(params.complexity_bin_size)?;
        if params.expand_max_steps == 0 {
            return Err(GenerateError::invalid("expand_max_steps must be at least 1"));
        }
        // the goal itself, then one board per tile next to the corner blank
        for (distance, available) in [(0, 1), (1, 2)] {
            if c1.contains(&distance) && bin_size > available {
                return Err(GenerateError::invalid(format!(
                    "only {available} tile board(s) lie {distance} moves from the goal, \
                     bin size {bin_size} cannot be filled"
                )));
            }
        }

        Ok(Self {
            board_size,
            solve_depth: c1.end() + params.stp_depth_slack,
            c1,
            bin_size,
            random_path_steps: params.random_path_steps,
            expand_max_steps: params.expand_max_steps,
            stagnation: Stagnation {
                interval: Duration::from_secs(params.interval.unwrap_or(20)),
                policy: params.on_stagnation,
            },
        })
    }

    pub fn num_tiles(&self) -> usize {
        usize::from(self.board_size) * usize::from(self.board_size) - 1
    }

    pub fn target_count(&self) -> u64 {
        self.c1.clone().count() as u64 * u64::from(self.bin_size)
    }
}

fn check_board_size(board_size: u8, max: u8) -> Result<u8, GenerateError> {
    if (2..=max).contains(&board_size) {
        Ok(board_size)
    } else {
        Err(GenerateError::invalid(format!(
            "board_size must be between 2 and {max}, got {board_size}"
        )))
    }
}

fn check_bin_size(bin_size: u32) -> Result<u32, GenerateError> {
    if bin_size == 0 {
        Err(GenerateError::invalid("complexity_bin_size must be at least 1"))
    } else {
        Ok(bin_size)
    }
}

type AxisRanges = (RangeInclusive<u32>, Option<RangeInclusive<u32>>);

fn check_complexity(complexity: &ComplexityParams) -> Result<AxisRanges, GenerateError> {
    let c1 = AxisConstraint::parse("c1", complexity.c1)?
        .range()
        .ok_or_else(|| GenerateError::invalid("c1 must be bounded: it sets the solver depth"))?;
    let c2 = AxisConstraint::parse("c2", complexity.c2)?.range();
    Ok((c1, c2))
}

/// `n choose k`, saturating at `u128::MAX`.
fn binomial(n: u64, k: u64) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // exact at every step: result * (n - i) is divisible by (i + 1)
        result = match result.checked_mul(u128::from(n - i)) {
            Some(product) => product / u128::from(i + 1),
            None => return u128::MAX,
        };
    }
    result
}
