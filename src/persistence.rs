//! JSON configuration files consumed by the renderer and experiment runner.
//!
//! One file per accepted instance, named
//! `config_<config_id>_b_<n>_g_<tokens>_c1_<c1>[_c2_<c2>]_i_<fill>.json`,
//! inside a per-run directory `<root>/<config_id>`.
//!
//! Command lists start with the literal `"start"` followed by one
//! `"move <color> <body> <direction>"` (geoms) or `"move tile <n> <direction>"`
//! (tiles) entry per move.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::board::{Position, State, TokenLabel};
use crate::error::GenerateError;
use crate::geometry::Move;

/// `experiment_type` written into every record.
pub const EXPERIMENT_TYPE: &str = "SlidingGeomPuzzle";

const CONFIG_PREFIX: &str = "config_";
const CONFIG_SUFFIX: &str = ".json";

/// One token's identity plus its start and goal cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub geom_nr: usize,
    pub body: String,
    pub color: String,
    pub start_coordinate: Position,
    pub goal_coordinate: Position,
}

/// The unit of output: one generated puzzle instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub config_instance_id: String,
    pub experiment_type: String,
    pub complexity_c1: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_c2: Option<u32>,
    pub grid_size: u8,
    pub landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_rendering: Option<bool>,
    pub shortest_move_sequence: Vec<String>,
    pub random_valid_move_sequence: Vec<String>,
    pub random_invalid_move_sequence: Vec<String>,
}

/// Everything needed to encode one instance.
pub struct InstanceData<'a> {
    pub board_size: u8,
    pub initial: &'a State,
    pub goal: &'a State,
    pub labels: &'a [TokenLabel],
    pub c1: u32,
    /// `None` for the tile variant.
    pub c2: Option<u32>,
    pub bin_fill: u32,
    pub shortest: &'a [Move],
    pub random_valid: &'a [Move],
    pub random_invalid: &'a [Move],
}

impl ConfigRecord {
    pub fn encode(config_id: &str, data: &InstanceData<'_>) -> Self {
        let config_instance_id = match data.c2 {
            Some(c2) => format!(
                "{config_id}_b_{}_g_{}_c1_{}_c2_{c2}_i_{}",
                data.board_size,
                data.labels.len(),
                data.c1,
                data.bin_fill
            ),
            None => format!(
                "{config_id}_b_{}_g_{}_c1_{}_i_{}",
                data.board_size,
                data.labels.len(),
                data.c1,
                data.bin_fill
            ),
        };

        let landmarks: Vec<Landmark> = data
            .labels
            .iter()
            .zip(data.initial.positions().iter().zip(data.goal.positions()))
            .enumerate()
            .map(|(token, (label, (&start, &goal)))| Landmark {
                geom_nr: token + 1,
                body: label.body.clone(),
                color: label.color.clone(),
                start_coordinate: start,
                goal_coordinate: goal,
            })
            .collect();

        Self {
            config_instance_id,
            experiment_type: EXPERIMENT_TYPE.to_string(),
            complexity_c1: data.c1,
            complexity_c2: data.c2,
            grid_size: data.board_size,
            use_rendering: data.c2.map(|_| true),
            shortest_move_sequence: move_commands(data.shortest, data.labels),
            random_valid_move_sequence: move_commands(data.random_valid, data.labels),
            random_invalid_move_sequence: move_commands(data.random_invalid, data.labels),
            landmarks,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{CONFIG_PREFIX}{}{CONFIG_SUFFIX}", self.config_instance_id)
    }
}

/// Renders moves as agent commands, prefixed with `"start"`.
///
/// Tile boards (every label a tile) name tokens by number, geom boards by
/// color and body.
pub fn move_commands(moves: &[Move], labels: &[TokenLabel]) -> Vec<String> {
    let tiles = labels.iter().all(TokenLabel::is_tile);
    let mut commands = Vec::with_capacity(moves.len() + 1);
    commands.push("start".to_string());

    for step in moves {
        let command = if tiles {
            format!("move tile {} {}", step.token + 1, step.direction)
        } else {
            let label = &labels[step.token];
            format!("move {} {} {}", label.color, label.body, step.direction)
        };
        commands.push(command);
    }

    commands
}

/// Output directory of one generation run.
#[derive(Debug, Clone)]
pub struct ConfigDir {
    config_id: String,
    path: PathBuf,
}

impl ConfigDir {
    /// Creates `<root>/<prefix>_ID_<timestamp>`.
    pub fn create(root: &Path, prefix: &str) -> Result<Self, GenerateError> {
        let config_id = format!("{prefix}_ID_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let path = root.join(&config_id);
        fs::create_dir_all(&path).map_err(GenerateError::io(&path))?;
        Ok(Self { config_id, path })
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one record; the returned path exists and is flushed.
    pub fn write(&self, record: &ConfigRecord) -> Result<PathBuf, GenerateError> {
        let path = self.path.join(record.file_name());
        write_json(&path, record)?;
        Ok(path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GenerateError> {
    let file = File::create(path).map_err(GenerateError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(GenerateError::json(path))?;
    writer.flush().map_err(GenerateError::io(path))
}

/// Config files directly inside `dir`, sorted by name.
fn config_files(dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(GenerateError::io(dir))? {
        let path = entry.map_err(GenerateError::io(dir))?.path();
        let is_config = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(CONFIG_PREFIX) && name.ends_with(CONFIG_SUFFIX));
        if is_config && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Number of config files in `dir`.
pub fn count_configs(dir: &Path) -> Result<usize, GenerateError> {
    Ok(config_files(dir)?.len())
}

/// Parses every config file in `dir`.
pub fn load_configs(dir: &Path) -> Result<Vec<ConfigRecord>, GenerateError> {
    config_files(dir)?
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).map_err(GenerateError::io(&path))?;
            serde_json::from_str(&text).map_err(GenerateError::json(&path))
        })
        .collect()
}

/// Aggregate counts over a directory of configs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStats {
    pub files: usize,
    /// `c1 -> c2 -> count`; tile records have no c2.
    pub complexity: BTreeMap<u32, BTreeMap<Option<u32>, usize>>,
    pub shapes: BTreeMap<String, usize>,
    pub colors: BTreeMap<String, usize>,
    pub combinations: BTreeMap<String, usize>,
}

impl ConfigStats {
    pub fn from_records(records: &[ConfigRecord]) -> Self {
        let mut stats = Self {
            files: records.len(),
            ..Self::default()
        };
        for record in records {
            *stats
                .complexity
                .entry(record.complexity_c1)
                .or_default()
                .entry(record.complexity_c2)
                .or_default() += 1;
            for landmark in &record.landmarks {
                *stats.shapes.entry(landmark.body.clone()).or_default() += 1;
                *stats.colors.entry(landmark.color.clone()).or_default() += 1;
                *stats
                    .combinations
                    .entry(format!("{} {}", landmark.color, landmark.body))
                    .or_default() += 1;
            }
        }
        stats
    }
}

impl fmt::Display for ConfigStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configs", self.files)?;
        writeln!(f, "complexity:")?;
        for (c1, row) in &self.complexity {
            for (c2, count) in row {
                match c2 {
                    Some(c2) => writeln!(f, "  c1={c1:<3} c2={c2:<3} {count}")?,
                    None => writeln!(f, "  c1={c1:<3} {count}")?,
                }
            }
        }
        for (title, counts) in [
            ("shapes", &self.shapes),
            ("colors", &self.colors),
            ("combinations", &self.combinations),
        ] {
            writeln!(f, "{title}:")?;
            for (name, count) in counts {
                writeln!(f, "  {name:<20} {count}")?;
            }
        }
        Ok(())
    }
}

/// Statistics over every config in `dir`.
pub fn config_stats(dir: &Path) -> Result<ConfigStats, GenerateError> {
    Ok(ConfigStats::from_records(&load_configs(dir)?))
}

/// Grid overlay drawn by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLabel {
    Edge,
    Cell,
    Both,
    None,
}

impl GridLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Cell => "cell",
            Self::Both => "both",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for GridLabel {
    type Err = GenerateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "edge" => Ok(Self::Edge),
            "cell" => Ok(Self::Cell),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            other => Err(GenerateError::invalid(format!(
                "grid_label must be one of edge, cell, both, none; got '{other}'"
            ))),
        }
    }
}

/// Renderer settings patched into existing configs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOverrides {
    pub grid_label: GridLabel,
    pub camera_offset: Option<[f64; 3]>,
    pub camera_auto_override: Option<[f64; 3]>,
    pub screenshot_alpha: Option<f64>,
    /// Written only into configs that do not already carry `use_rendering`.
    pub use_rendering: bool,
}

impl RenderOverrides {
    fn apply(&self, config: &mut Map<String, Value>) {
        config.insert("grid_label".into(), json!(self.grid_label.as_str()));
        if let Some(offset) = self.camera_offset {
            config.insert("camera_offset".into(), json!(offset));
        }
        if let Some(auto_override) = self.camera_auto_override {
            config.insert("camera_auto_override".into(), json!(auto_override));
        }
        if let Some(alpha) = self.screenshot_alpha {
            config.insert("screenshot_alpha".into(), json!(alpha));
        }
        config
            .entry("use_rendering")
            .or_insert(json!(self.use_rendering));
    }
}

/// Patches every config in `dir` with renderer settings, keeping all other fields.
///
/// Returns the number of files rewritten.
pub fn extend_configs(dir: &Path, overrides: &RenderOverrides) -> Result<usize, GenerateError> {
    let files = config_files(dir)?;
    for path in &files {
        let text = fs::read_to_string(path).map_err(GenerateError::io(path))?;
        let mut config: Map<String, Value> =
            serde_json::from_str(&text).map_err(GenerateError::json(path))?;
        overrides.apply(&mut config);
        write_json(path, &config)?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{state_of, TILE_BODY};
    use crate::geometry::Direction;

    fn geom_labels() -> Vec<TokenLabel> {
        vec![
            TokenLabel::new("sphere", "red"),
            TokenLabel::new("cone", "blue"),
        ]
    }

    fn sample_record(c2: Option<u32>, labels: &[TokenLabel]) -> ConfigRecord {
        let initial = state_of(&[(0, 0), (1, 1)]);
        let goal = state_of(&[(1, 0), (1, 1)]);
        let shortest = [Move {
            token: 0,
            direction: Direction::Right,
        }];
        ConfigRecord::encode(
            "SGP_ID_20250101_000000",
            &InstanceData {
                board_size: 3,
                initial: &initial,
                goal: &goal,
                labels,
                c1: 1,
                c2,
                bin_fill: 1,
                shortest: &shortest,
                random_valid: &[],
                random_invalid: &shortest,
            },
        )
    }

    #[test]
    fn test_geom_commands() {
        let moves = [
            Move {
                token: 1,
                direction: Direction::Up,
            },
            Move {
                token: 0,
                direction: Direction::Left,
            },
        ];
        insta::assert_debug_snapshot!(move_commands(&moves, &geom_labels()), @r#"
        [
            "start",
            "move blue cone up",
            "move red sphere left",
        ]
        "#);
    }

    #[test]
    fn test_tile_commands() {
        let labels = vec![TokenLabel::new(TILE_BODY, "green"); 3];
        let moves = [Move {
            token: 2,
            direction: Direction::Down,
        }];
        assert_eq!(
            move_commands(&moves, &labels),
            vec!["start".to_string(), "move tile 3 down".to_string()]
        );
        assert_eq!(move_commands(&[], &labels), vec!["start".to_string()]);
    }

    #[test]
    fn test_record_naming_and_fields() {
        let record = sample_record(Some(0), &geom_labels());
        assert_eq!(
            record.file_name(),
            "config_SGP_ID_20250101_000000_b_3_g_2_c1_1_c2_0_i_1.json"
        );
        assert_eq!(record.use_rendering, Some(true));
        assert_eq!(record.landmarks[0].geom_nr, 1);
        assert_eq!(record.landmarks[1].start_coordinate, Position::new(1, 1));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["complexity_c2"], 0);
        assert_eq!(json["landmarks"][0]["goal_coordinate"], json!([1, 0]));
        assert_eq!(json["shortest_move_sequence"], json!(["start", "move red sphere right"]));
        assert_eq!(json["random_valid_move_sequence"], json!(["start"]));
    }

    #[test]
    fn test_tile_record_omits_c2() {
        let labels = vec![TokenLabel::new(TILE_BODY, "green"); 2];
        let record = sample_record(None, &labels);
        assert_eq!(
            record.config_instance_id,
            "SGP_ID_20250101_000000_b_3_g_2_c1_1_i_1"
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("complexity_c2").is_none());
        assert!(json.get("use_rendering").is_none());
    }

    #[test]
    fn test_write_count_load_roundtrip() {
        let root = tempfile::tempdir().unwrap();
        let dir = ConfigDir::create(root.path(), "SGP").unwrap();
        assert!(dir.config_id().starts_with("SGP_ID_"));

        let record = sample_record(Some(0), &geom_labels());
        let path = dir.write(&record).unwrap();
        assert!(path.exists());
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(count_configs(dir.path()).unwrap(), 1);
        assert_eq!(load_configs(dir.path()).unwrap(), vec![record]);
    }

    #[test]
    fn test_write_into_removed_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        let dir = ConfigDir::create(root.path(), "SGP").unwrap();
        fs::remove_dir_all(dir.path()).unwrap();

        let err = dir.write(&sample_record(Some(0), &geom_labels())).unwrap_err();
        match err {
            GenerateError::Io { path, .. } => assert!(path.starts_with(dir.path())),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_stats_report() {
        let labels = geom_labels();
        let records = vec![
            sample_record(Some(0), &labels),
            sample_record(Some(0), &labels),
            sample_record(Some(1), &labels),
        ];
        let stats = ConfigStats::from_records(&records);
        assert_eq!(stats.files, 3);
        assert_eq!(stats.complexity[&1][&Some(0)], 2);
        assert_eq!(stats.shapes["sphere"], 3);
        assert_eq!(stats.combinations["blue cone"], 3);

        insta::assert_snapshot!(stats.to_string(), @r"
        3 configs
        complexity:
          c1=1   c2=0   2
          c1=1   c2=1   1
        shapes:
          cone                 3
          sphere               3
        colors:
          blue                 3
          red                  3
        combinations:
          blue cone            3
          red sphere           3
        ");
    }

    #[test]
    fn test_extend_configs_patches_and_preserves() {
        let root = tempfile::tempdir().unwrap();
        let dir = ConfigDir::create(root.path(), "SGP").unwrap();
        dir.write(&sample_record(Some(0), &geom_labels())).unwrap();

        let overrides = RenderOverrides {
            grid_label: "both".parse().unwrap(),
            camera_offset: Some([0.0, 5.57, -3.68]),
            camera_auto_override: None,
            screenshot_alpha: Some(0.0),
            use_rendering: false,
        };
        assert_eq!(extend_configs(dir.path(), &overrides).unwrap(), 1);

        let file = config_files(dir.path()).unwrap().remove(0);
        let patched: Value = serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(patched["grid_label"], "both");
        assert_eq!(patched["camera_offset"], json!([0.0, 5.57, -3.68]));
        assert_eq!(patched["screenshot_alpha"], json!(0.0));
        assert!(patched.get("camera_auto_override").is_none());
        // already present, so left alone
        assert_eq!(patched["use_rendering"], true);
        assert_eq!(patched["complexity_c1"], 1);

        // the patched file still loads as a record
        assert_eq!(load_configs(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_grid_label_validation() {
        assert_eq!("edge".parse::<GridLabel>().unwrap(), GridLabel::Edge);
        assert!("diagonal".parse::<GridLabel>().is_err());
    }
}
