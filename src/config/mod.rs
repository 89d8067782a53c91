//! Metronome configuration: the run snapshot, beat patterns, engine settings,
//! YAML persistence and named presets.

pub mod engine;
pub mod persistence;
pub mod preset;

pub use engine::{EngineConfig, SoundConfig, TimingConfig};
pub use persistence::{default_config_path, load_config, reset_config, save_config};
pub use preset::{
    default_presets_path, find_preset, load_presets, save_presets, MetronomePreset,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audio::ClickSound;
use crate::tempo::{CurveError, TempoCurve, TempoPoint, TempoStep};

/// Default grid length in cells.
pub const DEFAULT_TOTAL_CELLS: u32 = 16;

/// Per-beat accent: which click plays, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentType {
    High,
    Low,
    Mute,
}

impl AccentType {
    /// The click sound for this accent. `Mute` plays nothing.
    pub fn sound(self) -> Option<ClickSound> {
        match self {
            AccentType::High => Some(ClickSound::Accent),
            AccentType::Low => Some(ClickSound::Normal),
            AccentType::Mute => None,
        }
    }

    /// Next accent in the editing cycle `High -> Low -> Mute -> High`.
    pub fn next(self) -> Self {
        match self {
            AccentType::High => AccentType::Low,
            AccentType::Low => AccentType::Mute,
            AccentType::Mute => AccentType::High,
        }
    }
}

/// Accented downbeat followed by plain beats.
pub fn default_pattern(beats_per_bar: u32) -> Vec<AccentType> {
    (0..beats_per_bar)
        .map(|i| if i == 0 { AccentType::High } else { AccentType::Low })
        .collect()
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Curve(CurveError),
    ZeroBarsPerCell,
    ZeroBeatsPerBar,
    ZeroTotalCells,
    /// Beat pattern length differs from beats per bar.
    PatternLength { expected: usize, actual: usize },
    InvalidTiming(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Curve(e) => write!(f, "invalid tempo curve: {e}"),
            ConfigError::ZeroBarsPerCell => write!(f, "bars per cell must be at least 1"),
            ConfigError::ZeroBeatsPerBar => write!(f, "beats per bar must be at least 1"),
            ConfigError::ZeroTotalCells => write!(f, "grid must have at least one cell"),
            ConfigError::PatternLength { expected, actual } => write!(
                f,
                "beat pattern has {actual} entries, expected {expected}"
            ),
            ConfigError::InvalidTiming(msg) => write!(f, "invalid timing: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<CurveError> for ConfigError {
    fn from(e: CurveError) -> Self {
        ConfigError::Curve(e)
    }
}

/// Everything one metronome run needs. The scheduler takes its own copy at
/// start, so edits made while running apply to the next run only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeConfig {
    pub points: [TempoPoint; 3],
    pub bars_per_cell: u32,
    pub beats_per_bar: u32,
    #[serde(default)]
    pub tempo_step: TempoStep,
    #[serde(default)]
    pub stop_at_end: bool,
    #[serde(default = "MetronomeConfig::default_total_cells")]
    pub total_cells: u32,
    /// Left empty in a file means "use the default pattern".
    #[serde(default)]
    pub beat_pattern: Vec<AccentType>,
}

impl MetronomeConfig {
    fn default_total_cells() -> u32 {
        DEFAULT_TOTAL_CELLS
    }

    fn default_points() -> [TempoPoint; 3] {
        [
            TempoPoint::new(1, 100.0),
            TempoPoint::new(8, 160.0),
            TempoPoint::new(12, 130.0),
        ]
    }

    /// Check every field, returning the validated curve on success.
    pub fn validate(&self) -> Result<TempoCurve, ConfigError> {
        let curve = TempoCurve::new(self.points)?;
        if self.bars_per_cell == 0 {
            return Err(ConfigError::ZeroBarsPerCell);
        }
        if self.beats_per_bar == 0 {
            return Err(ConfigError::ZeroBeatsPerBar);
        }
        if self.total_cells == 0 {
            return Err(ConfigError::ZeroTotalCells);
        }
        if self.beat_pattern.len() != self.beats_per_bar as usize {
            return Err(ConfigError::PatternLength {
                expected: self.beats_per_bar as usize,
                actual: self.beat_pattern.len(),
            });
        }
        Ok(curve)
    }

    /// Bar at which a `stop_at_end` run finishes.
    pub fn end_bar(&self) -> u64 {
        u64::from(self.total_cells) * u64::from(self.bars_per_cell)
    }

    /// Cycle the accent of one beat. Out-of-range indices are ignored.
    pub fn toggle_beat(&mut self, index: usize) {
        if let Some(accent) = self.beat_pattern.get_mut(index) {
            *accent = accent.next();
        }
    }

    /// Change the meter, padding the pattern with `Low` or truncating it.
    pub fn set_beats_per_bar(&mut self, beats: u32) {
        self.beats_per_bar = beats;
        self.beat_pattern.resize(beats as usize, AccentType::Low);
    }

    pub fn set_points(&mut self, points: [TempoPoint; 3]) {
        self.points = points;
    }

    /// Fill in a missing pattern after loading from a file.
    pub fn normalize(&mut self) {
        if self.beat_pattern.is_empty() {
            self.beat_pattern = default_pattern(self.beats_per_bar);
        }
    }

    /// Replace this configuration with a preset's.
    pub fn apply_preset(&mut self, preset: &MetronomePreset) {
        *self = preset.config.clone();
        self.normalize();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            points: Self::default_points(),
            bars_per_cell: 2,
            beats_per_bar: 4,
            tempo_step: TempoStep::Bar,
            stop_at_end: false,
            total_cells: DEFAULT_TOTAL_CELLS,
            beat_pattern: default_pattern(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MetronomeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.beat_pattern,
            vec![
                AccentType::High,
                AccentType::Low,
                AccentType::Low,
                AccentType::Low
            ]
        );
        assert_eq!(config.end_bar(), 32);
    }

    #[test]
    fn validate_rejects_bad_bpm() {
        let mut config = MetronomeConfig::default();
        config.points[2].bpm = -10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Curve(CurveError::NonPositiveBpm { index: 2, .. }))
        ));
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        let mut config = MetronomeConfig::default();
        config.bars_per_cell = 0;
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroBarsPerCell);

        let mut config = MetronomeConfig::default();
        config.total_cells = 0;
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroTotalCells);

        let mut config = MetronomeConfig::default();
        config.beats_per_bar = 0;
        config.beat_pattern.clear();
        assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroBeatsPerBar);
    }

    #[test]
    fn validate_rejects_pattern_mismatch() {
        let mut config = MetronomeConfig::default();
        config.beats_per_bar = 3;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::PatternLength {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn toggle_cycles_accents() {
        let mut config = MetronomeConfig::default();
        config.toggle_beat(0);
        assert_eq!(config.beat_pattern[0], AccentType::Low);
        config.toggle_beat(0);
        assert_eq!(config.beat_pattern[0], AccentType::Mute);
        config.toggle_beat(0);
        assert_eq!(config.beat_pattern[0], AccentType::High);
    }

    #[test]
    fn toggle_out_of_range_is_noop() {
        let mut config = MetronomeConfig::default();
        let before = config.clone();
        config.toggle_beat(17);
        assert_eq!(config, before);
    }

    #[test]
    fn set_beats_per_bar_resizes_pattern() {
        let mut config = MetronomeConfig::default();
        config.toggle_beat(1);
        config.set_beats_per_bar(6);
        assert_eq!(config.beat_pattern.len(), 6);
        assert_eq!(config.beat_pattern[1], AccentType::Mute);
        assert_eq!(config.beat_pattern[5], AccentType::Low);

        config.set_beats_per_bar(2);
        assert_eq!(config.beat_pattern, vec![AccentType::High, AccentType::Mute]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn accent_sounds() {
        assert_eq!(AccentType::High.sound(), Some(ClickSound::Accent));
        assert_eq!(AccentType::Low.sound(), Some(ClickSound::Normal));
        assert_eq!(AccentType::Mute.sound(), None);
    }

    #[test]
    fn yaml_without_pattern_normalizes() {
        let yaml = r#"
points:
  - { bar: 0, bpm: 90.0 }
  - { bar: 4, bpm: 150.0 }
  - { bar: 6, bpm: 120.0 }
bars_per_cell: 1
beats_per_bar: 3
tempo_step: cell
"#;
        let mut config: MetronomeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.total_cells, DEFAULT_TOTAL_CELLS);
        assert!(!config.stop_at_end);
        assert_eq!(config.tempo_step, TempoStep::Cell);
        assert!(config.beat_pattern.is_empty());

        config.normalize();
        assert_eq!(config.beat_pattern, default_pattern(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut config = MetronomeConfig::default();
        config.stop_at_end = true;
        config.set_beats_per_bar(7);
        config.reset();
        assert_eq!(config, MetronomeConfig::default());
    }
}
