//! Transport state: the observation surface shared with the UI.
//!
//! Every field is its own atomic, written with a single store, so a reader
//! polling at render cadence never sees a half-updated value. Only the
//! scheduler thread and [`super::Metronome`] write; everyone else reads.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct TransportState {
    running: AtomicBool,
    /// Scheduling cursor. Runs up to one schedule-ahead window in front of
    /// what is audible.
    current_bar: AtomicU64,
    visual_bar: AtomicU64,
    beat_in_bar: AtomicU32,
    /// `f64` bits.
    current_bpm: AtomicU64,
}

/// A copy of every transport field, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub running: bool,
    pub current_bar: u64,
    pub visual_bar: u64,
    pub beat_in_bar: u32,
    pub current_bpm: f64,
}

impl TransportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn current_bar(&self) -> u64 {
        self.current_bar.load(Ordering::Acquire)
    }

    /// Bar most recently started by the scheduler. Changes once per bar.
    pub fn visual_bar(&self) -> u64 {
        self.visual_bar.load(Ordering::Acquire)
    }

    pub fn beat_in_bar(&self) -> u32 {
        self.beat_in_bar.load(Ordering::Acquire)
    }

    /// Tempo applied to the bar in [`visual_bar`](Self::visual_bar).
    /// Zero until the first bar starts.
    pub fn current_bpm(&self) -> f64 {
        f64::from_bits(self.current_bpm.load(Ordering::Acquire))
    }

    /// Read all fields. Each is individually consistent; the set may straddle
    /// one scheduler write.
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            running: self.is_running(),
            current_bar: self.current_bar(),
            visual_bar: self.visual_bar(),
            beat_in_bar: self.beat_in_bar(),
            current_bpm: self.current_bpm(),
        }
    }

    /// Back to a fresh, stopped transport.
    pub(crate) fn reset(&self) {
        self.running.store(false, Ordering::Release);
        self.current_bar.store(0, Ordering::Release);
        self.visual_bar.store(0, Ordering::Release);
        self.beat_in_bar.store(0, Ordering::Release);
        self.current_bpm.store(0.0f64.to_bits(), Ordering::Release);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub(crate) fn set_position(&self, bar: u64, beat_in_bar: u32) {
        self.current_bar.store(bar, Ordering::Release);
        self.beat_in_bar.store(beat_in_bar, Ordering::Release);
    }

    pub(crate) fn publish_bar(&self, bar: u64, bpm: f64) {
        self.visual_bar.store(bar, Ordering::Release);
        self.current_bpm.store(bpm.to_bits(), Ordering::Release);
    }
}
