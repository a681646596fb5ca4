//! WAV encoding for generated audio

use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

use super::waveform::Waveform;
use crate::error::{Error, Result};

/// Encodes f32 samples as 16-bit PCM WAV
pub struct AudioEncoder {
    sample_rate: u32,
    channels: u16,
}

impl AudioEncoder {
    /// Create a new encoder
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Mono encoder matching the waveform's sample rate
    pub fn for_waveform(waveform: &Waveform) -> Self {
        Self::new(waveform.sample_rate, 1)
    }

    /// Encode to WAV format
    pub fn encode_wav(&self, samples: &[f32]) -> Result<Vec<u8>> {
        if self.sample_rate == 0 {
            return Err(Error::AudioError("Sample rate must be non-zero".to_string()));
        }

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut buffer, spec)?;

            for &sample in samples {
                // NaN from a misbehaving model becomes silence
                let sample = if sample.is_finite() { sample } else { 0.0 };
                let sample_i16 = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                writer.write_sample(sample_i16)?;
            }

            writer.finalize()?;
        }

        debug!(
            "Encoded {} samples to WAV ({} bytes)",
            samples.len(),
            buffer.get_ref().len()
        );
        Ok(buffer.into_inner())
    }

    pub fn content_type() -> &'static str {
        "audio/wav"
    }
}
