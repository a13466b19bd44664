//! Sliding Puzzle Benchmark Generator
//!
//! Generates stratified sliding-geom and sliding-tile benchmark sets, solves
//! single instances, and inspects or patches directories of generated
//! configs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slidegen::board::{State, TokenLabel, TILE_BODY};
use slidegen::geometry::moves_along;
use slidegen::grid::format_state;
use slidegen::heuristic::manhattan;
use slidegen::params::GeneratorParams;
use slidegen::persistence::{self, GridLabel, RenderOverrides};
use slidegen::{plan_for, solver};

/// Generates sliding-puzzle benchmark configurations.
#[derive(Parser)]
#[command(name = "slidegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate sliding-geom configs (many tokens, free-form goals).
    GenerateSgp(GenerateArgs),
    /// Generate sliding-tile configs (one blank, canonical goal).
    GenerateStp(GenerateArgs),
    /// Solve one instance and print its optimal command list.
    Solve {
        #[arg(long)]
        board_size: u8,
        /// Start cells as JSON, e.g. `[[0,0],[1,2]]`.
        #[arg(long)]
        init: String,
        /// Goal cells as JSON, one per token of `--init`.
        #[arg(long)]
        goal: String,
        #[arg(long)]
        max_depth: Option<u32>,
    },
    /// Show the number of configs in a directory.
    Count { dir: PathBuf },
    /// Print complexity and label statistics for a directory.
    Stats { dir: PathBuf },
    /// Patch renderer settings into every config of a directory.
    Extend {
        dir: PathBuf,
        /// One of edge, cell, both, none.
        #[arg(long)]
        grid_label: GridLabel,
        #[arg(long, value_parser = parse_vec3)]
        camera_offset: Option<[f64; 3]>,
        #[arg(long, value_parser = parse_vec3)]
        camera_auto_override: Option<[f64; 3]>,
        #[arg(long)]
        screenshot_alpha: Option<f64>,
        /// Value for configs that do not set `use_rendering` yet.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        use_rendering: bool,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// JSON parameter file.
    #[arg(long)]
    params: PathBuf,
    /// Root directory; each run creates its own subdirectory.
    #[arg(long, default_value = "configs")]
    out: PathBuf,
    /// Overrides the parameter file's seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::GenerateSgp(args) => run_generate(false, &args),
        Command::GenerateStp(args) => run_generate(true, &args),
        Command::Solve {
            board_size,
            init,
            goal,
            max_depth,
        } => {
            print!("{}", run_solve(board_size, &init, &goal, max_depth)?);
            Ok(())
        }
        Command::Count { dir } => run_count(&dir),
        Command::Stats { dir } => run_stats(&dir),
        Command::Extend {
            dir,
            grid_label,
            camera_offset,
            camera_auto_override,
            screenshot_alpha,
            use_rendering,
        } => run_extend(
            &dir,
            &RenderOverrides {
                grid_label,
                camera_offset,
                camera_auto_override,
                screenshot_alpha,
                use_rendering,
            },
        ),
    }
}

/// Validates the parameter file, then fills every bin of the chosen variant.
fn run_generate(tiles: bool, args: &GenerateArgs) -> Result<()> {
    let params = GeneratorParams::load(&args.params)?;
    let plan = plan_for(tiles, &params)
        .with_context(|| format!("rejected parameters in {}", args.params.display()))?;

    let mut rng = match args.seed.or(params.seed) {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    info!(
        variant = plan.name(),
        board_size = plan.board_size(),
        target = plan.target_count(),
        "starting generation"
    );
    let report = plan.generate(&args.out, &mut rng)?;

    println!(
        "Wrote {} {} configs to {} ({} candidates, {} rejected)",
        report.written,
        plan.name(),
        report.output_dir.display(),
        report.candidates_checked,
        report.rejections.total()
    );
    Ok(())
}

/// Solves one pair and renders both boards, c1, c2 and the optimal commands.
fn run_solve(board_size: u8, init: &str, goal: &str, max_depth: Option<u32>) -> Result<String> {
    let initial: State = serde_json::from_str(init).context("parsing --init")?;
    let goal: State = serde_json::from_str(goal).context("parsing --goal")?;
    ensure!(
        initial.len() == goal.len(),
        "--init has {} tokens but --goal has {}",
        initial.len(),
        goal.len()
    );
    initial.validate(board_size).context("invalid --init")?;
    goal.validate(board_size).context("invalid --goal")?;

    let Some(path) = solver::a_star(board_size, &initial, &goal, max_depth) else {
        match max_depth {
            Some(depth) => bail!("no solution within {depth} moves"),
            None => bail!("no solution"),
        }
    };

    let c1 = (path.len() - 1) as u32;
    let c2 = (c1 - manhattan(&initial, &goal)) / 2;
    let labels = vec![TokenLabel::new(TILE_BODY, "none"); initial.len()];

    let mut output = String::new();
    writeln!(output, "c1: {c1}")?;
    writeln!(output, "c2: {c2}")?;
    writeln!(output, "initial:\n{}", format_state(&initial, board_size))?;
    writeln!(output, "goal:\n{}", format_state(&goal, board_size))?;
    for command in persistence::move_commands(&moves_along(&path), &labels) {
        writeln!(output, "{command}")?;
    }
    Ok(output)
}

fn run_count(dir: &Path) -> Result<()> {
    let count = persistence::count_configs(dir)?;
    println!("{count} configs");
    Ok(())
}

fn run_stats(dir: &Path) -> Result<()> {
    let stats = persistence::config_stats(dir)?;
    print!("{stats}");
    Ok(())
}

fn run_extend(dir: &Path, overrides: &RenderOverrides) -> Result<()> {
    let updated = persistence::extend_configs(dir, overrides)?;
    println!("Updated {updated} configs in {}", dir.display());
    Ok(())
}

/// Parses `x,y,z` into three floats.
fn parse_vec3(value: &str) -> Result<[f64; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|err| format!("'{part}': {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    parts
        .try_into()
        .map_err(|parts: Vec<f64>| format!("expected 3 comma-separated values, got {}", parts.len()))
}
