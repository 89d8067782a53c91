//! Commands sent from the scheduler thread to the audio thread via ring buffer.

use std::sync::Arc;

use super::sample::SampleData;

#[derive(Debug)]
pub enum AudioCommand {
    /// Start playing `data` at absolute output frame `start_frame`.
    Play {
        data: Arc<SampleData>,
        start_frame: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::{
        traits::{Consumer, Producer, Split},
        HeapRb,
    };

    #[test]
    fn play_commands_keep_order() {
        let rb = HeapRb::<AudioCommand>::new(4);
        let (mut prod, mut cons) = rb.split();
        let data = Arc::new(SampleData::from_mono(vec![1.0], 44100));

        for frame in [100, 50, 200] {
            prod.try_push(AudioCommand::Play {
                data: Arc::clone(&data),
                start_frame: frame,
            })
            .unwrap();
        }

        let frames: Vec<u64> = std::iter::from_fn(|| cons.try_pop())
            .map(|AudioCommand::Play { start_frame, .. }| start_frame)
            .collect();
        assert_eq!(frames, vec![100, 50, 200]);
    }

    #[test]
    fn full_buffer_rejects_push() {
        let rb = HeapRb::<AudioCommand>::new(1);
        let (mut prod, _cons) = rb.split();
        let data = Arc::new(SampleData::from_mono(vec![1.0], 44100));

        assert!(prod
            .try_push(AudioCommand::Play {
                data: Arc::clone(&data),
                start_frame: 0,
            })
            .is_ok());
        assert!(prod
            .try_push(AudioCommand::Play {
                data,
                start_frame: 1,
            })
            .is_err());
    }
}
