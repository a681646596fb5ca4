use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::warn;

use crate::error::{Error, Result};

/// Resample mono audio from `src_rate` to `dst_rate`.
///
/// Uses a windowed-sinc resampler; inputs too short for the sinc kernel and
/// resampler failures fall back to linear interpolation.
pub fn resample(audio: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>> {
    if src_rate == 0 || dst_rate == 0 {
        return Err(Error::AudioError(format!(
            "Cannot resample {} Hz -> {} Hz",
            src_rate, dst_rate
        )));
    }
    if audio.is_empty() || src_rate == dst_rate {
        return Ok(audio.to_vec());
    }

    if audio.len() < 32 {
        return Ok(resample_linear(audio, src_rate, dst_rate));
    }

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = dst_rate as f64 / src_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, audio.len(), 1)
        .map_err(|e| Error::AudioError(format!("Resampler init failed: {e}")))?;

    let input = vec![audio.to_vec()];
    match resampler.process(&input, None) {
        Ok(mut out) => Ok(out.pop().unwrap_or_default()),
        Err(e) => {
            warn!("Sinc resampling failed ({}), using linear fallback", e);
            Ok(resample_linear(audio, src_rate, dst_rate))
        }
    }
}

fn resample_linear(audio: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    let ratio = dst_rate as f64 / src_rate as f64;
    let out_len = ((audio.len() as f64) * ratio).round().max(1.0) as usize;
    let last = audio.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let left = (src_pos.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (src_pos - left as f64).clamp(0.0, 1.0) as f32;
            audio[left] * (1.0 - frac) + audio[right] * frac
        })
        .collect()
}
