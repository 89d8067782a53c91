//! Output clock: frames rendered by the audio callback, shared lock-free.
//!
//! The callback is the only writer. Readers convert the frame count to
//! seconds, which gives the scheduler a clock that cannot drift against what
//! the device actually plays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OutputClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl OutputClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Frames rendered so far; also the frame the next block starts at.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Record `frames` more frames as rendered.
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current clock time in seconds.
    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Nearest frame to `secs` on this clock.
    pub fn frame_at(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.sample_rate as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = OutputClock::new(48000);
        assert_eq!(clock.frames(), 0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn advance_moves_time() {
        let clock = OutputClock::new(48000);
        clock.advance(24000);
        assert_eq!(clock.frames(), 24000);
        assert!((clock.now() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn clones_share_counter() {
        let clock = OutputClock::new(44100);
        let reader = clock.clone();
        clock.advance(441);
        assert_eq!(reader.frames(), 441);
    }

    #[test]
    fn frame_at_rounds_to_nearest() {
        let clock = OutputClock::new(44100);
        assert_eq!(clock.frame_at(1.0), 44100);
        assert_eq!(clock.frame_at(0.5), 22050);
        assert_eq!(clock.frame_at(-1.0), 0);
        // 60 / 130 bpm = 0.4615... s = 20353.8 frames
        assert_eq!(clock.frame_at(60.0 / 130.0), 20354);
    }
}
