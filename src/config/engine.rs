//! Engine configuration: scheduler timing and click sounds, loaded from
//! ~/.accelerando/engine.yaml.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Poll cadence and schedule-ahead window of the look-ahead scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How often the timing loop wakes up to top up the window.
    #[serde(default = "TimingConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How far ahead of the audio clock clicks are committed.
    #[serde(default = "TimingConfig::default_schedule_ahead_ms")]
    pub schedule_ahead_ms: u64,
}

impl TimingConfig {
    fn default_poll_interval_ms() -> u64 {
        25
    }

    fn default_schedule_ahead_ms() -> u64 {
        100
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Schedule-ahead window in seconds of audio clock.
    pub fn schedule_ahead_secs(&self) -> f64 {
        self.schedule_ahead_ms as f64 / 1000.0
    }

    /// The window must outlast one poll period or clicks arrive late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "poll interval must be positive".to_string(),
            ));
        }
        if self.schedule_ahead_ms <= self.poll_interval_ms {
            return Err(ConfigError::InvalidTiming(format!(
                "schedule-ahead window ({} ms) must exceed poll interval ({} ms)",
                self.schedule_ahead_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::default_poll_interval_ms(),
            schedule_ahead_ms: Self::default_schedule_ahead_ms(),
        }
    }
}

/// Optional WAV files for the two clicks. Unset means synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default)]
    pub accent: Option<PathBuf>,
    #[serde(default)]
    pub normal: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sounds: SoundConfig,
}

impl EngineConfig {
    /// Load from ~/.accelerando/engine.yaml.
    /// Returns None if the file is missing or unreadable.
    pub fn load() -> Option<Self> {
        let home = dirs::home_dir()?;
        let path = home.join(".accelerando").join("engine.yaml");
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }
}
