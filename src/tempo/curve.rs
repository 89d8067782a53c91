//! Piecewise-linear tempo lookup over the bar grid.
//!
//! Control points are stored in cell units; every lookup converts them to
//! bars first. Tempo is flat before the first point and after the last one,
//! and each segment interpolates linearly. A zero-width segment has its
//! denominator floored to one bar, which makes it an instantaneous jump.

use super::point::{TempoCurve, TempoStep};

/// Linear interpolation that returns `from` and `to` exactly at the ends.
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

fn segment(bar: u64, start_bar: u64, end_bar: u64, from: f64, to: f64) -> f64 {
    let span = end_bar.saturating_sub(start_bar).max(1);
    let t = (bar - start_bar) as f64 / span as f64;
    lerp(from, to, t)
}

impl TempoCurve {
    /// Instantaneous tempo at `bar`.
    pub fn bpm_at(&self, bar: u64, bars_per_cell: u32) -> f64 {
        let per_cell = u64::from(bars_per_cell);
        let [a, b, c] = self.points();
        let (a_bar, b_bar, c_bar) = (
            u64::from(a.position) * per_cell,
            u64::from(b.position) * per_cell,
            u64::from(c.position) * per_cell,
        );

        if bar <= a_bar {
            a.bpm
        } else if bar <= b_bar {
            segment(bar, a_bar, b_bar, a.bpm, b.bpm)
        } else if bar <= c_bar {
            segment(bar, b_bar, c_bar, b.bpm, c.bpm)
        } else {
            c.bpm
        }
    }

    /// Tempo applied while playing `bar`, honouring the resampling step.
    ///
    /// With [`TempoStep::Cell`] every bar of a cell uses the tempo of the
    /// cell's first bar.
    pub fn bpm_for_bar(&self, bar: u64, bars_per_cell: u32, step: TempoStep) -> f64 {
        let sample_bar = match step {
            TempoStep::Bar => bar,
            TempoStep::Cell => {
                let per_cell = u64::from(bars_per_cell.max(1));
                (bar / per_cell) * per_cell
            }
        };
        self.bpm_at(sample_bar, bars_per_cell)
    }

    /// One bpm value per bar across the whole grid, for tempo graphs.
    pub fn build_tempo_map(
        &self,
        bars_per_cell: u32,
        step: TempoStep,
        total_cells: u32,
    ) -> Vec<f64> {
        let total_bars = u64::from(total_cells) * u64::from(bars_per_cell);
        (0..total_bars)
            .map(|bar| self.bpm_for_bar(bar, bars_per_cell, step))
            .collect()
    }
}
