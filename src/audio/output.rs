//! The seam between the scheduler and whatever plays the clicks.

use std::sync::Arc;

use super::sample::SampleData;
use super::AudioError;
use crate::config::AccentType;

/// The two percussive samples a metronome needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickSound {
    Accent,
    Normal,
}

/// A loaded sample, cheap to clone and hand to the audio thread.
#[derive(Debug, Clone)]
pub struct SampleHandle {
    sound: ClickSound,
    data: Arc<SampleData>,
}

impl SampleHandle {
    pub fn new(sound: ClickSound, data: SampleData) -> Self {
        Self {
            sound,
            data: Arc::new(data),
        }
    }

    pub fn sound(&self) -> ClickSound {
        self.sound
    }

    pub fn data(&self) -> &Arc<SampleData> {
        &self.data
    }
}

/// An audio output with its own high-resolution clock.
///
/// Timestamps are seconds on that clock, never wall-clock time. Events
/// scheduled in the future play at exactly that time regardless of when
/// `schedule` was called.
pub trait AudioOutput: Send + 'static {
    /// Current time of the output clock in seconds.
    fn now(&self) -> f64;

    /// Load (or synthesize) one of the click samples.
    fn load_sample(&mut self, sound: ClickSound) -> Result<SampleHandle, AudioError>;

    /// Commit `sample` to start at `at` seconds on the output clock.
    fn schedule(&mut self, sample: &SampleHandle, at: f64) -> Result<(), AudioError>;
}

/// Opens an [`AudioOutput`] on demand, so device setup happens on first start.
pub trait OutputFactory {
    type Output: AudioOutput;

    fn open(&mut self) -> Result<Self::Output, AudioError>;
}

impl<O, F> OutputFactory for F
where
    O: AudioOutput,
    F: FnMut() -> Result<O, AudioError>,
{
    type Output = O;

    fn open(&mut self) -> Result<O, AudioError> {
        self()
    }
}

/// Accent and normal clicks loaded from one output.
#[derive(Debug, Clone)]
pub struct ClickSamples {
    accent: SampleHandle,
    normal: SampleHandle,
}

impl ClickSamples {
    pub fn load<O: AudioOutput>(output: &mut O) -> Result<Self, AudioError> {
        Ok(Self {
            accent: output.load_sample(ClickSound::Accent)?,
            normal: output.load_sample(ClickSound::Normal)?,
        })
    }

    /// The sample to play for `accent`, or `None` for a muted beat.
    pub fn for_accent(&self, accent: AccentType) -> Option<&SampleHandle> {
        match accent.sound()? {
            ClickSound::Accent => Some(&self.accent),
            ClickSound::Normal => Some(&self.normal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineOutput;

    #[test]
    fn samples_follow_accent() {
        let mut output = OfflineOutput::new(44100);
        let samples = ClickSamples::load(&mut output).unwrap();

        assert_eq!(
            samples.for_accent(AccentType::High).map(SampleHandle::sound),
            Some(ClickSound::Accent)
        );
        assert_eq!(
            samples.for_accent(AccentType::Low).map(SampleHandle::sound),
            Some(ClickSound::Normal)
        );
        assert!(samples.for_accent(AccentType::Mute).is_none());
    }

    #[test]
    fn handle_clones_share_data() {
        let handle = SampleHandle::new(
            ClickSound::Accent,
            SampleData::from_mono(vec![0.5, 0.25], 44100),
        );
        let copy = handle.clone();
        assert!(Arc::ptr_eq(handle.data(), copy.data()));
    }

    #[test]
    fn closure_is_a_factory() {
        let mut factory = || Ok::<_, AudioError>(OfflineOutput::new(48000));
        let output = factory.open().unwrap();
        assert_eq!(output.now(), 0.0);

        let mut failing = || Err::<OfflineOutput, _>(AudioError::NoOutputDevice);
        assert!(matches!(failing.open(), Err(AudioError::NoOutputDevice)));
    }
}
