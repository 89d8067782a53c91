//! Offline output: a manually driven clock that records what was scheduled.
//!
//! Clones share the clock and the log, so a test (or a dry run) can keep one
//! handle while the scheduler thread owns another.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::click;
use super::output::{AudioOutput, ClickSound, SampleHandle};
use super::sample::SampleError;
use super::AudioError;

/// One click as committed to the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledClick {
    pub sound: ClickSound,
    /// Start time on the output clock.
    pub at: f64,
    /// Output clock time when `schedule` was called.
    pub scheduled_at: f64,
}

#[derive(Debug, Clone)]
pub struct OfflineOutput {
    sample_rate: u32,
    /// Current time in seconds, stored as `f64` bits.
    now: Arc<AtomicU64>,
    log: Arc<Mutex<Vec<ScheduledClick>>>,
    samples_available: Arc<AtomicBool>,
}

impl OfflineOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            now: Arc::new(AtomicU64::new(0.0f64.to_bits())),
            log: Arc::new(Mutex::new(Vec::new())),
            samples_available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// An output whose sample loading always fails.
    pub fn without_samples(sample_rate: u32) -> Self {
        let output = Self::new(sample_rate);
        output.samples_available.store(false, Ordering::Release);
        output
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_time(&self, secs: f64) {
        self.now.store(secs.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, secs: f64) {
        self.set_time(self.now() + secs);
    }

    /// Everything scheduled so far, in scheduling order.
    pub fn clicks(&self) -> Vec<ScheduledClick> {
        self.lock_log().clone()
    }

    /// Drain the log.
    pub fn take_clicks(&self) -> Vec<ScheduledClick> {
        std::mem::take(&mut *self.lock_log())
    }

    fn lock_log(&self) -> MutexGuard<'_, Vec<ScheduledClick>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioOutput for OfflineOutput {
    fn now(&self) -> f64 {
        f64::from_bits(self.now.load(Ordering::Acquire))
    }

    fn load_sample(&mut self, sound: ClickSound) -> Result<SampleHandle, AudioError> {
        if !self.samples_available.load(Ordering::Acquire) {
            return Err(AudioError::Sample(SampleError::Empty));
        }
        Ok(SampleHandle::new(
            sound,
            click::synthesize(sound, self.sample_rate),
        ))
    }

    fn schedule(&mut self, sample: &SampleHandle, at: f64) -> Result<(), AudioError> {
        let scheduled_at = self.now();
        self.lock_log().push(ScheduledClick {
            sound: sample.sound(),
            at,
            scheduled_at,
        });
        Ok(())
    }
}
