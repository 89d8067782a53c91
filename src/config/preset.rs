//! Named presets stored as a YAML list.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AccentType, MetronomeConfig, DEFAULT_TOTAL_CELLS};
use crate::tempo::{TempoPoint, TempoStep};

/// A named configuration. Presets written without `beats_per_bar` or
/// `tempo_step` get 4 beats and cell stepping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PresetRecord")]
pub struct MetronomePreset {
    pub name: String,
    #[serde(flatten)]
    pub config: MetronomeConfig,
}

/// On-disk shape of a preset, with the preset-specific defaults.
#[derive(Deserialize)]
struct PresetRecord {
    name: String,
    points: [TempoPoint; 3],
    bars_per_cell: u32,
    #[serde(default = "PresetRecord::default_beats_per_bar")]
    beats_per_bar: u32,
    #[serde(default = "PresetRecord::default_tempo_step")]
    tempo_step: TempoStep,
    #[serde(default)]
    stop_at_end: bool,
    #[serde(default = "PresetRecord::default_total_cells")]
    total_cells: u32,
    #[serde(default)]
    beat_pattern: Vec<AccentType>,
}

impl PresetRecord {
    fn default_beats_per_bar() -> u32 {
        4
    }

    fn default_tempo_step() -> TempoStep {
        TempoStep::Cell
    }

    fn default_total_cells() -> u32 {
        DEFAULT_TOTAL_CELLS
    }
}

impl From<PresetRecord> for MetronomePreset {
    fn from(record: PresetRecord) -> Self {
        Self {
            name: record.name,
            config: MetronomeConfig {
                points: record.points,
                bars_per_cell: record.bars_per_cell,
                beats_per_bar: record.beats_per_bar,
                tempo_step: record.tempo_step,
                stop_at_end: record.stop_at_end,
                total_cells: record.total_cells,
                beat_pattern: record.beat_pattern,
            },
        }
    }
}

impl MetronomePreset {
    pub fn new(name: impl Into<String>, config: MetronomeConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

pub fn default_presets_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".accelerando");
    path.push("presets.yaml");
    path
}

/// Load presets from a YAML list. A missing file yields no presets.
pub fn load_presets(path: &Path) -> Result<Vec<MetronomePreset>, io::Error> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn save_presets(path: &Path, presets: &[MetronomePreset]) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(presets).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}

/// Case-insensitive lookup by name.
pub fn find_preset<'a>(
    presets: &'a [MetronomePreset],
    name: &str,
) -> Option<&'a MetronomePreset> {
    presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
