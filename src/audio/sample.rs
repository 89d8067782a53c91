//! Click samples: WAV decoding, mono mixdown and resampling to the device rate.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

#[derive(Debug)]
pub enum SampleError {
    Io(std::io::Error),
    Wav(hound::Error),
    /// The WAV file contains no samples.
    Empty,
    /// The WAV header declares a sample rate of zero.
    ZeroSampleRate,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Io(e) => write!(f, "cannot read sample: {e}"),
            SampleError::Wav(e) => write!(f, "WAV error: {e}"),
            SampleError::Empty => write!(f, "WAV file contains no samples"),
            SampleError::ZeroSampleRate => write!(f, "WAV header has a zero sample rate"),
        }
    }
}

impl std::error::Error for SampleError {}

impl From<std::io::Error> for SampleError {
    fn from(e: std::io::Error) -> Self {
        SampleError::Io(e)
    }
}

impl From<hound::Error> for SampleError {
    fn from(e: hound::Error) -> Self {
        SampleError::Wav(e)
    }
}

/// A mono buffer at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleData {
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Open and decode a WAV file for playback at `target_rate`.
    pub fn from_wav_file(path: &Path, target_rate: u32) -> Result<Self, SampleError> {
        let file = File::open(path)?;
        Self::from_wav(BufReader::new(file), target_rate)
    }

    /// Decode a WAV stream, averaging channels to mono and resampling
    /// linearly when the file's rate differs from `target_rate`.
    pub fn from_wav<R: Read + Seek>(reader: R, target_rate: u32) -> Result<Self, SampleError> {
        let wav = hound::WavReader::new(reader)?;
        let spec = wav.spec();
        if spec.sample_rate == 0 {
            return Err(SampleError::ZeroSampleRate);
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = (1u32 << (spec.bits_per_sample - 1)) as f32;
                wav.into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            hound::SampleFormat::Float => wav
                .into_samples::<f32>()
                .collect::<Result<Vec<f32>, _>>()?,
        };
        if interleaved.is_empty() {
            return Err(SampleError::Empty);
        }

        let mono = mix_to_mono(&interleaved, spec.channels.max(1) as usize);
        let samples = if spec.sample_rate == target_rate {
            mono
        } else {
            resample_linear(&mono, spec.sample_rate, target_rate)
        };

        Ok(Self {
            samples,
            sample_rate: target_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample_linear(input: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if input.len() < 2 {
        return input.to_vec();
    }

    let step = source_rate as f64 / target_rate as f64;
    let out_len = (input.len() as f64 / step).ceil() as usize;
    let last = input.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            match input.get(idx + 1) {
                Some(&next) => input[idx] * (1.0 - frac) + next * frac,
                None => input[idx],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes<S: hound::Sample + Copy>(
        samples: &[S],
        sample_rate: u32,
        channels: u16,
        bits: u16,
        format: hound::SampleFormat,
    ) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: format,
        };
        let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_16bit_mono() {
        let bytes = wav_bytes(&[0i16, 16384, -16384], 44100, 1, 16, hound::SampleFormat::Int);
        let sd = SampleData::from_wav(Cursor::new(bytes), 44100).unwrap();
        assert_eq!(sd.len(), 3);
        assert!(sd.samples()[0].abs() < 1e-6);
        assert!((sd.samples()[1] - 0.5).abs() < 1e-3);
        assert!((sd.samples()[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn stereo_float_mixes_to_mono() {
        let bytes = wav_bytes(
            &[0.8f32, 0.2, -0.4, -0.6],
            48000,
            2,
            32,
            hound::SampleFormat::Float,
        );
        let sd = SampleData::from_wav(Cursor::new(bytes), 48000).unwrap();
        assert_eq!(sd.len(), 2);
        assert!((sd.samples()[0] - 0.5).abs() < 1e-6);
        assert!((sd.samples()[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_wav_is_an_error() {
        let bytes = wav_bytes::<f32>(&[], 44100, 1, 32, hound::SampleFormat::Float);
        assert!(matches!(
            SampleData::from_wav(Cursor::new(bytes), 44100),
            Err(SampleError::Empty)
        ));
    }

    #[test]
    fn zero_sample_rate_is_an_error() {
        let mut bytes = wav_bytes(&[100i16, 200, 300], 8000, 1, 16, hound::SampleFormat::Int);
        // Sample rate field of the fmt chunk.
        bytes[24..28].copy_from_slice(&0u32.to_le_bytes());
        let err = SampleData::from_wav(Cursor::new(bytes), 44100).unwrap_err();
        assert!(matches!(
            err,
            SampleError::ZeroSampleRate | SampleError::Wav(_)
        ));
    }

    #[test]
    fn resamples_to_target_rate() {
        let input: Vec<f32> = (0..100).map(|i| (i as f32 / 100.0).sin()).collect();
        let bytes = wav_bytes(&input, 22050, 1, 32, hound::SampleFormat::Float);
        let sd = SampleData::from_wav(Cursor::new(bytes), 44100).unwrap();
        assert_eq!(sd.sample_rate(), 44100);
        assert_eq!(sd.len(), 200);
        assert!((sd.samples()[0] - input[0]).abs() < 1e-6);
    }

    #[test]
    fn downsampling_halves_length() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let output = resample_linear(&input, 44100, 22050);
        assert_eq!(output.len(), 50);
        assert!((output[1] - input[2]).abs() < 1e-6);
    }

    #[test]
    fn tiny_inputs_pass_through() {
        assert!(resample_linear(&[], 44100, 22050).is_empty());
        assert_eq!(resample_linear(&[0.5], 44100, 22050), vec![0.5]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SampleData::from_wav_file(&dir.path().join("nope.wav"), 44100).unwrap_err();
        assert!(matches!(err, SampleError::Io(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("click.wav");
        std::fs::write(
            &path,
            wav_bytes(&[0.25f32; 10], 44100, 1, 32, hound::SampleFormat::Float),
        )
        .unwrap();
        let sd = SampleData::from_wav_file(&path, 44100).unwrap();
        assert_eq!(sd.len(), 10);
        assert!((sd.duration_secs() - 10.0 / 44100.0).abs() < 1e-12);
    }
}
