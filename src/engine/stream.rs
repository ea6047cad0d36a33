//! Real-time playback backend.
//!
//! Scheduled fragments are resampled to the output rate once, then a
//! single pacing loop mixes all live voices into fixed-size stereo chunks
//! against the wall clock. Consumers (the TCP monitor stream) receive
//! chunks over a watch channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rubato::{FftFixedIn, Resampler};
use tokio::sync::watch;

use crate::constants::OUTPUT_SAMPLE_RATE;
use crate::decoder::AudioFragment;
use crate::engine::{AudioEngine, CompletionSender, VoiceId};

const TARGET_CHUNK_SIZE: usize = 128;

/// A stereo sample pair (left, right) as 16-bit signed integers.
pub type Sample = (i16, i16);

/// Receiver side of the mixed output stream.
pub type MixOutput = watch::Receiver<Vec<Sample>>;

struct Voice {
    id: VoiceId,
    /// Absolute position on the output timeline, in output samples.
    start_sample: u64,
    /// Mono samples at [OUTPUT_SAMPLE_RATE].
    samples: Vec<f32>,
    done: CompletionSender,
}

pub struct StreamEngine {
    started: Instant,
    next_voice: AtomicU64,
    voices: Mutex<Vec<Voice>>,
}

impl StreamEngine {
    /// Creates the engine and starts its pacing loop. The returned
    /// receiver yields mixed stereo chunks in real time (silence while
    /// no voice is live).
    pub fn start() -> (Arc<Self>, MixOutput) {
        let engine = Arc::new(StreamEngine {
            started: Instant::now(),
            next_voice: AtomicU64::new(1),
            voices: Mutex::new(Vec::new()),
        });

        let (tx, rx) = watch::channel(Default::default());
        start_mix_loop(engine.clone(), tx);

        (engine, rx)
    }

    fn lock_voices(&self) -> std::sync::MutexGuard<'_, Vec<Voice>> {
        match self.voices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl AudioEngine for StreamEngine {
    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn schedule(&self, fragment: AudioFragment, start: f64, done: CompletionSender) -> VoiceId {
        let id = self.next_voice.fetch_add(1, Ordering::Relaxed);
        let samples = resample_to_output(fragment.samples(), fragment.sample_rate());
        let start_sample = (start * OUTPUT_SAMPLE_RATE as f64).round() as u64;

        self.lock_voices().push(Voice {
            id,
            start_sample,
            samples,
            done,
        });

        id
    }

    fn halt(&self, voice: VoiceId) {
        self.lock_voices().retain(|v| v.id != voice);
    }
}

fn start_mix_loop(engine: Arc<StreamEngine>, tx: watch::Sender<Vec<Sample>>) {
    tokio::spawn(async move {
        let mut sample_send_count: u64 = 0;

        let sleep_time = std::time::Duration::from_micros(
            ((TARGET_CHUNK_SIZE as f64 / OUTPUT_SAMPLE_RATE as f64) * 1_000_000.0) as u64,
        );

        loop {
            let expected_sent_samples = ((engine.started.elapsed() + sleep_time).as_secs_f64()
                * OUTPUT_SAMPLE_RATE as f64) as u64;

            let chunk_size = expected_sent_samples.saturating_sub(sample_send_count) as usize;
            let mut chunk = Vec::with_capacity(chunk_size);

            {
                let mut voices = engine.lock_voices();

                for k in 0..chunk_size {
                    let index = sample_send_count + k as u64;
                    let mut mixed = 0.0f32;

                    for voice in voices.iter() {
                        if index < voice.start_sample {
                            continue;
                        }
                        let offset = (index - voice.start_sample) as usize;
                        if let Some(sample) = voice.samples.get(offset) {
                            mixed += sample;
                        }
                    }

                    let s = (mixed.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    chunk.push((s, s));
                }

                // Voices whose last sample falls inside this chunk are done
                let cutoff = sample_send_count + chunk_size as u64;
                voices.retain(|voice| {
                    let end = voice.start_sample + voice.samples.len() as u64;
                    if end <= cutoff {
                        let _ = voice.done.send(voice.id);
                        false
                    } else {
                        true
                    }
                });
            }

            sample_send_count += chunk_size as u64;

            if tx.send(chunk).is_err() {
                // All consumers gone, nothing left to pace
                break;
            }

            tokio::time::sleep(sleep_time).await;
        }
    });
}

/// Resample mono audio from the fragment's native rate to [OUTPUT_SAMPLE_RATE].
fn resample_to_output(input: &[f32], source_rate: u32) -> Vec<f32> {
    if input.is_empty() || source_rate == OUTPUT_SAMPLE_RATE {
        return input.to_vec();
    }

    let resampler = FftFixedIn::<f64>::new(
        source_rate as usize,
        OUTPUT_SAMPLE_RATE as usize,
        1024, // chunk size
        2,    // sub-chunks
        1,    // mono input
    );

    let mut resampler = match resampler {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create output resampler: {e}");
            return Vec::new();
        }
    };

    let chunk_size = resampler.input_frames_max();
    let mut output = Vec::with_capacity(input.len() * 2);

    for chunk_start in (0..input.len()).step_by(chunk_size) {
        let chunk_end = (chunk_start + chunk_size).min(input.len());
        let mut chunk: Vec<f64> = input[chunk_start..chunk_end]
            .iter()
            .map(|&s| s as f64)
            .collect();

        // Pad last chunk if needed
        chunk.resize(chunk_size, 0.0);

        match resampler.process(&[chunk], None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    output.extend(channel.iter().map(|&s| s as f32));
                }
            }
            Err(e) => {
                warn!("Resampling error: {e}");
            }
        }
    }

    output
}
