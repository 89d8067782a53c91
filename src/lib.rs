//! Accelerando: a metronome whose tempo follows a three-point curve across a
//! grid of cells, with sample-accurate look-ahead click scheduling.

pub mod audio;
pub mod config;
pub mod logging;
pub mod tempo;
pub mod transport;
