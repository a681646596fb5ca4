//! Decoding of uploaded and model-produced audio

use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::encoder::AudioEncoder;
use super::resample::resample;
use super::waveform::Waveform;
use super::STT_SAMPLE_RATE;
use crate::error::{Error, Result};

/// Decode any container symphonia understands into a mono waveform.
///
/// Multi-channel input is down-mixed by averaging each frame.
pub fn decode_audio(data: Bytes) -> Result<Waveform> {
    if data.is_empty() {
        return Err(Error::InvalidInput("Audio upload is empty".to_string()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::AudioError("No decodable audio track".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                let channels = spec.channels.count().max(1);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);

                for frame in buffer.samples().chunks(channels) {
                    let sum: f32 = frame.iter().copied().sum();
                    mono.push(sum / frame.len() as f32);
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt audio packet: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if sample_rate == 0 {
        return Err(Error::AudioError("Unknown sample rate".to_string()));
    }

    debug!("Decoded {} mono samples at {} Hz", mono.len(), sample_rate);
    Ok(Waveform::new(mono, sample_rate))
}

/// Parse WAV bytes produced by a model pipeline
pub fn decode_wav_bytes(wav_bytes: &[u8]) -> Result<Waveform> {
    let mut reader = hound::WavReader::new(Cursor::new(wav_bytes))?;

    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample.max(2) as u32;
            let max_val = ((1i64 << (bits - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| (s as f32 / max_val).clamp(-1.0, 1.0))
                .collect()
        }
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
    };

    let samples = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().copied().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Turn an arbitrary upload into 16 kHz mono 16-bit PCM WAV bytes for STT
pub fn normalize_for_transcription(data: Bytes) -> Result<Vec<u8>> {
    let decoded = decode_audio(data)?;
    let samples = resample(&decoded.samples, decoded.sample_rate, STT_SAMPLE_RATE)?;
    AudioEncoder::new(STT_SAMPLE_RATE, 1).encode_wav(&samples)
}
