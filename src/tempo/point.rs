//! Tempo control points and the validated three-point curve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fastest tempo a control point may carry.
pub const MAX_BPM: f64 = 1000.0;

/// One control point on the tempo grid.
///
/// `position` is a cell index; it is converted to bars by multiplying with
/// the configured bars-per-cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoPoint {
    #[serde(alias = "bar")]
    pub position: u32,
    pub bpm: f64,
}

impl TempoPoint {
    pub fn new(position: u32, bpm: f64) -> Self {
        Self { position, bpm }
    }
}

/// Whether tempo is resampled every bar or held for a whole cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempoStep {
    #[default]
    Bar,
    Cell,
}

/// Errors raised when three points do not form a usable curve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    /// A control point's bpm is zero, negative, NaN or infinite.
    NonPositiveBpm { index: usize, bpm: f64 },
    /// A control point's bpm is above [`MAX_BPM`].
    BpmOutOfRange { index: usize, bpm: f64 },
    /// Control points are not ordered `A <= B <= C` by position.
    PointsOutOfOrder { first: u32, second: u32 },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::NonPositiveBpm { index, bpm } => {
                write!(f, "control point {index} has invalid bpm {bpm}")
            }
            CurveError::BpmOutOfRange { index, bpm } => {
                write!(f, "control point {index} bpm {bpm} exceeds {MAX_BPM}")
            }
            CurveError::PointsOutOfOrder { first, second } => write!(
                f,
                "control points out of order: cell {first} comes after cell {second}"
            ),
        }
    }
}

impl std::error::Error for CurveError {}

/// Start, peak and end control points, ordered by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoCurve {
    points: [TempoPoint; 3],
}

impl TempoCurve {
    /// Build a curve, rejecting invalid bpm values and unordered points.
    pub fn new(points: [TempoPoint; 3]) -> Result<Self, CurveError> {
        for (index, point) in points.iter().enumerate() {
            if !point.bpm.is_finite() || point.bpm <= 0.0 {
                return Err(CurveError::NonPositiveBpm {
                    index,
                    bpm: point.bpm,
                });
            }
            if point.bpm > MAX_BPM {
                return Err(CurveError::BpmOutOfRange {
                    index,
                    bpm: point.bpm,
                });
            }
        }
        for pair in points.windows(2) {
            if pair[0].position > pair[1].position {
                return Err(CurveError::PointsOutOfOrder {
                    first: pair[0].position,
                    second: pair[1].position,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn start(&self) -> TempoPoint {
        self.points[0]
    }

    pub fn peak(&self) -> TempoPoint {
        self.points[1]
    }

    pub fn end(&self) -> TempoPoint {
        self.points[2]
    }

    pub fn points(&self) -> [TempoPoint; 3] {
        self.points
    }
}
