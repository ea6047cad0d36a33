//! Decodes commentary audio payloads into playable fragments.
//!
//! The service delivers each fragment as base64 text wrapping 16-bit
//! little-endian PCM at 24 kHz, mono. Decoding is pure: no I/O, no
//! side effects, just bytes in and normalized samples out.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use byteorder::{ByteOrder, LittleEndian};

use crate::constants::SOURCE_SAMPLE_RATE;

/// One contiguous block of decoded mono audio. Immutable once built;
/// cloning shares the underlying samples.
#[derive(Clone)]
pub struct AudioFragment {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl AudioFragment {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

impl fmt::Debug for AudioFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFragment")
            .field("samples", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Decode a base64 audio payload into an [AudioFragment].
///
/// Samples are normalized to [-1.0, 1.0) by dividing each 16-bit integer
/// by 32768. An odd byte count means a truncated sample and is rejected.
pub fn decode_fragment(encoded: &str) -> Result<AudioFragment> {
    let bytes = BASE64
        .decode(encoded)
        .context("Audio payload is not valid base64")?;

    if bytes.len() % 2 != 0 {
        bail!(
            "PCM16 payload has an odd byte count ({}), dropping fragment",
            bytes.len()
        );
    }

    let mut ints = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(&bytes, &mut ints);

    let samples = ints.iter().map(|&s| s as f32 / 32768.0).collect();

    Ok(AudioFragment::new(samples, SOURCE_SAMPLE_RATE))
}
