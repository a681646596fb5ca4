use crate::error::{Error, Result};

/// Mono waveform with samples in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; num_samples], sample_rate)
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Join waveforms end to end, in order. All parts must share a sample rate.
    pub fn concat(parts: Vec<Waveform>) -> Result<Waveform> {
        let mut parts = parts.into_iter();
        let Some(mut joined) = parts.next() else {
            return Err(Error::AudioError("No audio to concatenate".to_string()));
        };

        for part in parts {
            if part.sample_rate != joined.sample_rate {
                return Err(Error::AudioError(format!(
                    "Sample rate mismatch: {} Hz vs {} Hz",
                    joined.sample_rate, part.sample_rate
                )));
            }
            joined.samples.extend_from_slice(&part.samples);
        }

        Ok(joined)
    }
}
