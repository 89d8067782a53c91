//! Audio output: dedicated stream thread, lock-free command queue, output clock.
//!
//! [`AudioEngine`] owns a cpal output stream on its own thread and accepts
//! timestamped click commands through a lock-free ring buffer. The stream
//! callback counts rendered frames into an [`OutputClock`], which is the
//! clock the scheduler reads through [`AudioOutput::now`].

pub mod callback;
pub mod click;
pub mod clock;
pub mod command;
pub mod offline;
pub mod output;
pub mod sample;

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};

pub use clock::OutputClock;
pub use command::AudioCommand;
pub use offline::{OfflineOutput, ScheduledClick};
pub use output::{AudioOutput, ClickSamples, ClickSound, OutputFactory, SampleHandle};
pub use sample::{SampleData, SampleError};

use crate::config::SoundConfig;
use callback::AudioCallback;

/// Ring buffer capacity (number of pending play commands).
const RING_BUFFER_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum AudioError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to query device configuration.
    DeviceConfig(String),
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start the audio stream.
    StreamPlay(String),
    /// Ring buffer is full; the audio thread is not draining fast enough.
    BufferFull,
    /// A click sample could not be loaded.
    Sample(SampleError),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device found"),
            AudioError::DeviceConfig(e) => write!(f, "device config error: {e}"),
            AudioError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            AudioError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            AudioError::BufferFull => write!(f, "audio command ring buffer is full"),
            AudioError::Sample(e) => write!(f, "sample error: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<SampleError> for AudioError {
    fn from(e: SampleError) -> Self {
        AudioError::Sample(e)
    }
}

/// The cpal-backed output.
///
/// `cpal::Stream` cannot leave the thread that built it on every platform, so
/// the stream lives on a dedicated thread that parks until the engine drops.
pub struct AudioEngine {
    producer: ringbuf::HeapProd<AudioCommand>,
    clock: OutputClock,
    channels: u16,
    sounds: SoundConfig,
    shutdown: Option<mpsc::Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
}

impl AudioEngine {
    /// Open the default output device and start its stream.
    pub fn new(sounds: SoundConfig) -> Result<Self, AudioError> {
        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let (ready_tx, ready_rx) = mpsc::channel::<Result<(OutputClock, u16), AudioError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let stream_thread = thread::Builder::new()
            .name("accelerando-audio".to_string())
            .spawn(move || {
                let stream = match build_stream(consumer) {
                    Ok((stream, clock, channels)) => {
                        let _ = ready_tx.send(Ok((clock, channels)));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // Blocks until the engine drops its sender.
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        let (clock, channels) = ready_rx
            .recv()
            .map_err(|_| AudioError::StreamBuild("audio thread exited".to_string()))??;

        tracing::debug!(
            sample_rate = clock.sample_rate(),
            channels,
            "audio output opened"
        );

        Ok(Self {
            producer,
            clock,
            channels,
            sounds,
            shutdown: Some(shutdown_tx),
            stream_thread: Some(stream_thread),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn build_stream(
    consumer: ringbuf::HeapCons<AudioCommand>,
) -> Result<(cpal::Stream, OutputClock, u16), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;

    let config = device
        .default_output_config()
        .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let clock = OutputClock::new(sample_rate);
    let mut audio_callback = AudioCallback::new(consumer, clock.clone(), channels);

    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_fn = |err: cpal::StreamError| {
        tracing::error!(error = %err, "audio stream error");
    };

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                audio_callback.process(data);
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

    Ok((stream, clock, channels))
}

impl AudioOutput for AudioEngine {
    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn load_sample(&mut self, sound: ClickSound) -> Result<SampleHandle, AudioError> {
        let path = match sound {
            ClickSound::Accent => self.sounds.accent.as_deref(),
            ClickSound::Normal => self.sounds.normal.as_deref(),
        };
        let data = match path {
            Some(path) => SampleData::from_wav_file(path, self.sample_rate())?,
            None => click::synthesize(sound, self.sample_rate()),
        };
        Ok(SampleHandle::new(sound, data))
    }

    fn schedule(&mut self, sample: &SampleHandle, at: f64) -> Result<(), AudioError> {
        self.producer
            .try_push(AudioCommand::Play {
                data: sample.data().clone(),
                start_frame: self.clock.frame_at(at),
            })
            .map_err(|_| AudioError::BufferFull)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(thread) = self.stream_thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires audio device. Run manually with `cargo test -- --ignored`
    fn engine_opens_default_device() {
        let engine = AudioEngine::new(SoundConfig::default()).expect("no audio device");
        assert!(engine.sample_rate() > 0);
        assert!(engine.channels() > 0);
    }

    #[test]
    #[ignore] // Requires audio device
    fn engine_clock_runs() {
        let mut engine = AudioEngine::new(SoundConfig::default()).expect("no audio device");
        let click = engine.load_sample(ClickSound::Accent).unwrap();
        let start = engine.now();
        engine.schedule(&click, start + 0.05).unwrap();
        thread::sleep(std::time::Duration::from_millis(200));
        assert!(engine.now() > start);
    }

    #[test]
    fn audio_error_display() {
        assert_eq!(
            AudioError::NoOutputDevice.to_string(),
            "no audio output device found"
        );
        assert_eq!(
            AudioError::BufferFull.to_string(),
            "audio command ring buffer is full"
        );
        assert_eq!(
            AudioError::Sample(SampleError::Empty).to_string(),
            "sample error: WAV file contains no samples"
        );
    }
}
