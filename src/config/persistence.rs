//! Config persistence: YAML load/save/reset for the metronome configuration.

use std::io;
use std::path::{Path, PathBuf};

use super::MetronomeConfig;

/// Default path for the saved configuration.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".accelerando");
    path.push("metronome.yaml");
    path
}

/// Load a configuration from a YAML file. Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<MetronomeConfig, io::Error> {
    if !path.exists() {
        return Ok(MetronomeConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let mut config: MetronomeConfig = serde_yaml::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    config.normalize();
    Ok(config)
}

/// Save a configuration to a YAML file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &MetronomeConfig) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(config).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}

/// Remove the saved file and return a fresh default configuration.
pub fn reset_config(path: &Path) -> Result<MetronomeConfig, io::Error> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(MetronomeConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccentType;
    use crate::tempo::TempoStep;

    #[test]
    fn load_nonexistent_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, MetronomeConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metronome.yaml");

        let mut config = MetronomeConfig::default();
        config.tempo_step = TempoStep::Cell;
        config.stop_at_end = true;
        config.set_beats_per_bar(5);
        config.toggle_beat(4);
        config.toggle_beat(4);

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.beat_pattern[4], AccentType::High);
    }

    #[test]
    fn malformed_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metronome.yaml");
        std::fs::write(&path, "points: nope").unwrap();
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn reset_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metronome.yaml");

        save_config(&path, &MetronomeConfig::default()).unwrap();
        assert!(path.exists());

        let fresh = reset_config(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(fresh, MetronomeConfig::default());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("metronome.yaml");
        save_config(&path, &MetronomeConfig::default()).unwrap();
        assert!(path.exists());
    }
}
