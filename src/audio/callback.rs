//! Audio callback: runs on the cpal audio thread.
//!
//! Drains play commands from the ring buffer, writes every active click into
//! the block at its exact start frame, hard-clamps the result and advances
//! the shared [`OutputClock`].

use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::clock::OutputClock;
use super::command::AudioCommand;
use super::sample::SampleData;

/// Clicks that may sound at once. Further commands are dropped.
const MAX_VOICES: usize = 64;

/// Output is clamped to `[-OUTPUT_CEILING, OUTPUT_CEILING]`.
const OUTPUT_CEILING: f32 = 0.95;

struct Voice {
    data: Arc<SampleData>,
    start_frame: u64,
    /// Next sample index to play.
    pos: usize,
}

impl Voice {
    fn finished(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    voices: Vec<Voice>,
    clock: OutputClock,
    channels: u16,
}

impl AudioCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, clock: OutputClock, channels: u16) -> Self {
        Self {
            consumer,
            voices: Vec::with_capacity(MAX_VOICES),
            clock,
            channels,
        }
    }

    /// Called by cpal for each buffer of interleaved frames.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Play { data, start_frame } => {
                    if self.voices.len() < MAX_VOICES {
                        self.voices.push(Voice {
                            data,
                            start_frame,
                            pos: 0,
                        });
                    }
                }
            }
        }

        output.fill(0.0);

        let channels = self.channels.max(1) as usize;
        let frames = output.len() / channels;
        let block_start = self.clock.frames();

        for voice in self.voices.iter_mut() {
            // A click that is already due starts at the top of the block.
            let offset = voice.start_frame.saturating_sub(block_start);
            if offset >= frames as u64 {
                continue;
            }
            let samples = voice.data.samples();
            for frame in output.chunks_exact_mut(channels).skip(offset as usize) {
                let Some(&s) = samples.get(voice.pos) else {
                    break;
                };
                for out in frame.iter_mut() {
                    *out += s;
                }
                voice.pos += 1;
            }
        }
        self.voices.retain(|v| !v.finished());

        for sample in output.iter_mut() {
            *sample = sample.clamp(-OUTPUT_CEILING, OUTPUT_CEILING);
        }

        self.clock.advance(frames as u64);
    }

    pub fn clock(&self) -> &OutputClock {
        &self.clock
    }

    /// Number of clicks waiting to start or still sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}
