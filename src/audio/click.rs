//! Synthesized click sounds, used when no WAV file is configured.
//!
//! Both clicks are short decaying sine pings. The normal click adds a seeded
//! noise transient so it stays distinguishable from the accent at any volume.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::output::ClickSound;
use super::sample::SampleData;

const CLICK_MS: usize = 30;
const CLICK_SECS: f64 = CLICK_MS as f64 / 1000.0;
const ACCENT_FREQ: f64 = 1500.0;
const NORMAL_FREQ: f64 = 1000.0;
const TRANSIENT_MS: usize = 2;
const NOISE_SEED: u64 = 42;

fn ping(sample_rate: u32, freq: f64, gain: f64) -> Vec<f32> {
    let len = sample_rate as usize * CLICK_MS / 1000;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let amp = (-t / CLICK_SECS * 8.0).exp() * gain;
            ((2.0 * std::f64::consts::PI * freq * t).sin() * amp) as f32
        })
        .collect()
}

/// High, bright ping for accented beats.
pub fn generate_accent_click(sample_rate: u32) -> Vec<f32> {
    ping(sample_rate, ACCENT_FREQ, 0.9)
}

/// Lower ping with a short noise attack for regular beats.
pub fn generate_normal_click(sample_rate: u32, seed: u64) -> Vec<f32> {
    let mut out = ping(sample_rate, NORMAL_FREQ, 0.6);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let transient = sample_rate as usize * TRANSIENT_MS / 1000;
    for (i, sample) in out.iter_mut().take(transient).enumerate() {
        let env = 1.0 - i as f32 / transient as f32;
        *sample += rng.gen_range(-0.3f32..0.3) * env;
    }
    out
}

pub fn synthesize(sound: ClickSound, sample_rate: u32) -> SampleData {
    let samples = match sound {
        ClickSound::Accent => generate_accent_click(sample_rate),
        ClickSound::Normal => generate_normal_click(sample_rate, NOISE_SEED),
    };
    SampleData::from_mono(samples, sample_rate)
}
