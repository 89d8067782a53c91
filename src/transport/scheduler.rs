//! Look-ahead scheduler: one poll tick of the timing loop.
//!
//! Each tick commits every beat that falls inside the schedule-ahead window
//! to the output at its exact timestamp on the output clock. When the tick
//! itself fires is irrelevant: timestamps are accumulated from beat
//! durations, never derived from the poll time.

use tracing::warn;

use crate::audio::{AudioOutput, ClickSamples};
use crate::config::{AccentType, ConfigError, MetronomeConfig};
use crate::tempo::TempoCurve;

use super::state::TransportState;

/// Most beats one tick may commit; the rest wait for the next poll.
pub const MAX_BEATS_PER_TICK: usize = 256;

/// What the timing loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// `stop_at_end` is set and the cursor reached the end of the grid.
    Finished,
}

pub struct LookAheadScheduler {
    config: MetronomeConfig,
    curve: TempoCurve,
    samples: ClickSamples,
    /// Seconds of output clock committed ahead of `now`.
    schedule_ahead: f64,
    next_event_time: f64,
    current_bar: u64,
    beat_in_bar: u32,
}

impl LookAheadScheduler {
    /// Build a scheduler over its own copy of `config`.
    pub fn new(
        config: MetronomeConfig,
        samples: ClickSamples,
        schedule_ahead: f64,
    ) -> Result<Self, ConfigError> {
        let curve = config.validate()?;
        Ok(Self {
            config,
            curve,
            samples,
            schedule_ahead,
            next_event_time: 0.0,
            current_bar: 0,
            beat_in_bar: 0,
        })
    }

    /// Rewind to bar 0 with the first beat due at `now`.
    pub fn begin(&mut self, now: f64) {
        self.next_event_time = now;
        self.current_bar = 0;
        self.beat_in_bar = 0;
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn current_bar(&self) -> u64 {
        self.current_bar
    }

    pub fn beat_in_bar(&self) -> u32 {
        self.beat_in_bar
    }

    pub fn config(&self) -> &MetronomeConfig {
        &self.config
    }

    /// Hand the samples back once the run is over.
    pub fn into_samples(self) -> ClickSamples {
        self.samples
    }

    fn reached_end(&self) -> bool {
        self.config.stop_at_end && self.current_bar >= self.config.end_bar()
    }

    /// Fill the schedule-ahead window.
    pub fn tick<O: AudioOutput>(
        &mut self,
        output: &mut O,
        transport: &TransportState,
    ) -> TickOutcome {
        let horizon = output.now() + self.schedule_ahead;
        for _ in 0..MAX_BEATS_PER_TICK {
            if self.reached_end() {
                return TickOutcome::Finished;
            }
            if self.next_event_time >= horizon {
                return TickOutcome::Continue;
            }
            self.schedule_beat(output, transport);
        }
        if self.reached_end() {
            TickOutcome::Finished
        } else {
            TickOutcome::Continue
        }
    }

    fn schedule_beat<O: AudioOutput>(&mut self, output: &mut O, transport: &TransportState) {
        let now = output.now();
        if self.next_event_time < now {
            warn!(
                behind_ms = (now - self.next_event_time) * 1000.0,
                bar = self.current_bar,
                "scheduler fell behind the output clock, re-anchoring"
            );
            self.next_event_time = now;
        }

        let bpm = self.curve.bpm_for_bar(
            self.current_bar,
            self.config.bars_per_cell,
            self.config.tempo_step,
        );
        if self.beat_in_bar == 0 {
            transport.publish_bar(self.current_bar, bpm);
        }

        let accent = self
            .config
            .beat_pattern
            .get(self.beat_in_bar as usize)
            .copied()
            .unwrap_or(AccentType::Mute);
        if let Some(sample) = self.samples.for_accent(accent) {
            if let Err(e) = output.schedule(sample, self.next_event_time) {
                warn!(
                    error = %e,
                    bar = self.current_bar,
                    beat = self.beat_in_bar,
                    "dropping click"
                );
            }
        }

        self.next_event_time += 60.0 / bpm;
        self.beat_in_bar += 1;
        if self.beat_in_bar >= self.config.beats_per_bar {
            self.beat_in_bar = 0;
            self.current_bar += 1;
        }
        transport.set_position(self.current_bar, self.beat_in_bar);
    }
}
