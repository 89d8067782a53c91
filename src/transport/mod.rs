//! Transport: the metronome's timing loop, its owner, and the state it
//! publishes.
//!
//! [`Metronome`] acquires the audio output lazily on the first `start`, runs
//! a [`LookAheadScheduler`] on a dedicated polling thread and exposes a
//! shared [`TransportState`] for the UI. The output and loaded samples move
//! into the thread for the duration of a run and come back when it is
//! joined, so they are reused by the next `start`.

pub mod scheduler;
pub mod state;

pub use scheduler::{LookAheadScheduler, TickOutcome};
pub use state::{TransportSnapshot, TransportState};

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::audio::{AudioError, AudioOutput, ClickSamples, OutputFactory};
use crate::config::{ConfigError, MetronomeConfig, TimingConfig};

#[derive(Debug)]
pub enum MetronomeError {
    /// The audio output or a click sample could not be acquired.
    ResourceUnavailable(AudioError),
    InvalidConfig(ConfigError),
    /// The scheduler thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for MetronomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetronomeError::ResourceUnavailable(e) => write!(f, "audio unavailable: {e}"),
            MetronomeError::InvalidConfig(e) => write!(f, "invalid configuration: {e}"),
            MetronomeError::Spawn(e) => write!(f, "cannot start scheduler thread: {e}"),
        }
    }
}

impl std::error::Error for MetronomeError {}

impl From<AudioError> for MetronomeError {
    fn from(e: AudioError) -> Self {
        MetronomeError::ResourceUnavailable(e)
    }
}

impl From<ConfigError> for MetronomeError {
    fn from(e: ConfigError) -> Self {
        MetronomeError::InvalidConfig(e)
    }
}

/// An open output with its clicks loaded.
struct Resources<O> {
    output: O,
    samples: ClickSamples,
}

pub struct Metronome<F: OutputFactory> {
    factory: F,
    timing: TimingConfig,
    transport: Arc<TransportState>,
    /// Held here between runs, owned by the worker during one.
    resources: Option<Resources<F::Output>>,
    worker: Option<JoinHandle<Resources<F::Output>>>,
}

impl<F: OutputFactory> Metronome<F> {
    /// A metronome with the default 25 ms poll and 100 ms window.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            timing: TimingConfig::default(),
            transport: Arc::new(TransportState::new()),
            resources: None,
            worker: None,
        }
    }

    pub fn with_timing(factory: F, timing: TimingConfig) -> Result<Self, ConfigError> {
        timing.validate()?;
        let mut metronome = Self::new(factory);
        metronome.timing = timing;
        Ok(metronome)
    }

    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    /// Shared handle for observers.
    pub fn transport(&self) -> Arc<TransportState> {
        Arc::clone(&self.transport)
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Start a run from bar 0 over a private copy of `config`.
    ///
    /// A running metronome is stopped and restarted. On error the metronome
    /// is left stopped.
    pub fn start(&mut self, config: &MetronomeConfig) -> Result<(), MetronomeError> {
        config.validate()?;

        if self.worker.is_some() {
            debug!("restarting metronome");
        }
        self.join_worker();

        let Resources { mut output, samples } = match self.resources.take() {
            Some(resources) => resources,
            None => self.acquire()?,
        };

        let mut scheduler = LookAheadScheduler::new(
            config.clone(),
            samples,
            self.timing.schedule_ahead_secs(),
        )?;
        scheduler.begin(output.now());

        self.transport.reset();
        self.transport.set_running(true);

        let transport = Arc::clone(&self.transport);
        let poll = self.timing.poll_interval();
        let spawned = thread::Builder::new()
            .name("accelerando-scheduler".to_string())
            .spawn(move || run_loop(scheduler, output, &transport, poll));

        match spawned {
            Ok(worker) => {
                info!(
                    bars_per_cell = config.bars_per_cell,
                    beats_per_bar = config.beats_per_bar,
                    tempo_step = ?config.tempo_step,
                    stop_at_end = config.stop_at_end,
                    "metronome started"
                );
                self.worker = Some(worker);
                Ok(())
            }
            Err(e) => {
                self.transport.set_running(false);
                Err(MetronomeError::Spawn(e))
            }
        }
    }

    /// Stop scheduling. Clicks already committed to the output still play.
    ///
    /// Returns immediately; the loop exits at its next poll. Stopping a
    /// stopped metronome does nothing.
    pub fn stop(&mut self) {
        if self.transport.is_running() {
            debug!(bar = self.transport.current_bar(), "metronome stopping");
        }
        self.transport.set_running(false);
    }

    /// Stop and wait for the loop to exit.
    pub fn stop_blocking(&mut self) {
        self.stop();
        self.join_worker();
    }

    fn acquire(&mut self) -> Result<Resources<F::Output>, AudioError> {
        debug!("acquiring audio output");
        let mut output = self.factory.open()?;
        let samples = ClickSamples::load(&mut output)?;
        Ok(Resources { output, samples })
    }

    /// Stop the worker, wait for it and take the resources back.
    fn join_worker(&mut self) {
        self.transport.set_running(false);
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(resources) => self.resources = Some(resources),
                Err(_) => error!("scheduler thread panicked, output will be reopened"),
            }
        }
    }
}

impl<F: OutputFactory> Drop for Metronome<F> {
    fn drop(&mut self) {
        self.join_worker();
    }
}

fn run_loop<O: AudioOutput>(
    mut scheduler: LookAheadScheduler,
    mut output: O,
    transport: &TransportState,
    poll: Duration,
) -> Resources<O> {
    while transport.is_running() {
        if scheduler.tick(&mut output, transport) == TickOutcome::Finished {
            transport.set_running(false);
            info!(bar = scheduler.current_bar(), "reached end of grid");
            break;
        }
        thread::sleep(poll);
    }
    debug!(bar = scheduler.current_bar(), "scheduler loop exited");

    Resources {
        output,
        samples: scheduler.into_samples(),
    }
}
