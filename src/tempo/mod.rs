//! Tempo curve: three control points mapped onto the bar grid.
//!
//! Pure lookups only; the scheduler in [`crate::transport`] calls these once
//! per beat and the UI calls [`TempoCurve::build_tempo_map`] once per
//! configuration change.

pub mod curve;
pub mod point;

pub use point::{CurveError, TempoCurve, TempoPoint, TempoStep, MAX_BPM};
