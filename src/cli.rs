use std::path::PathBuf;

use accelerando::tempo::TempoStep;
use clap::{Parser, ValueEnum};

#[derive(Debug, Parser, Clone)]
#[command(name = "accelerando")]
#[command(about = "Metronome with a three-point tempo curve")]
pub struct Cli {
    /// Metronome configuration file (default ~/.accelerando/metronome.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Load the named preset over the configuration.
    #[arg(long)]
    pub preset: Option<String>,

    /// Preset file (default ~/.accelerando/presets.yaml).
    #[arg(long)]
    pub presets: Option<PathBuf>,

    /// Stop when the end of the grid is reached.
    #[arg(long)]
    pub stop_at_end: bool,

    /// Resample tempo every bar or once per cell.
    #[arg(long, value_enum)]
    pub step: Option<StepArg>,

    /// Print the per-bar tempo map and exit.
    #[arg(long)]
    pub print_map: bool,

    /// Schedule this many seconds against an offline clock and print the
    /// clicks instead of playing them.
    #[arg(long, value_name = "SECONDS")]
    pub dry_run: Option<f64>,

    /// Write the resulting configuration back to the config file.
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StepArg {
    Bar,
    Cell,
}

impl From<StepArg> for TempoStep {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::Bar => TempoStep::Bar,
            StepArg::Cell => TempoStep::Cell,
        }
    }
}
