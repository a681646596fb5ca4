//! Audio bridge: upload decoding, resampling, WAV encoding and
//! sentence-chunked synthesis

mod decode;
mod encoder;
mod resample;
mod segment;
mod synthesis;
mod waveform;

pub use decode::{decode_audio, decode_wav_bytes, normalize_for_transcription};
pub use encoder::AudioEncoder;
pub use resample::resample;
pub use segment::split_sentences;
pub use synthesis::synthesize_chunked;
pub use waveform::Waveform;

/// Sample rate expected by the speech-to-text pipeline
pub const STT_SAMPLE_RATE: u32 = 16_000;
