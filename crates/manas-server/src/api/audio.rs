//! Audio endpoints: soundscape generation, transcription and speech synthesis

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use manas_core::audio::{normalize_for_transcription, synthesize_chunked, AudioEncoder, Waveform};
use manas_core::prompts;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::require_text;
use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "audio_file";

#[derive(Debug, Deserialize)]
pub struct SoundscapeRequest {
    pub word: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

fn wav_response(waveform: &Waveform) -> Result<Response, manas_core::Error> {
    let encoder = AudioEncoder::for_waveform(waveform);
    let wav = encoder.encode_wav(&waveform.samples)?;
    Ok(([(header::CONTENT_TYPE, AudioEncoder::content_type())], wav).into_response())
}

/// Word -> LLM-written audio prompt -> generated ambience as WAV
pub async fn generate_soundscape(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SoundscapeRequest>, ApiError>,
) -> Result<Response, ApiError> {
    const PUBLIC_ERROR: &str = "The cave's echoes are silent right now.";

    let word = require_text("word", &req.word)?;
    let llm = state.registry.llm()?;
    let generator = state.registry.audio_gen()?;

    let raw_prompt = llm
        .generate(&prompts::soundscape(word))
        .await
        .public_error(PUBLIC_ERROR)?;
    let audio_prompt = prompts::clean_audio_prompt(&raw_prompt);
    info!("Generated audio prompt: {}", audio_prompt);

    let waveform = generator
        .generate(&audio_prompt)
        .await
        .public_error(PUBLIC_ERROR)?;
    wav_response(&waveform).public_error(PUBLIC_ERROR)
}

/// Multipart upload -> 16 kHz mono WAV -> text
pub async fn transcribe(
    State(state): State<AppState>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    const PUBLIC_ERROR: &str = "Failed to transcribe audio.";

    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let upload = upload
        .filter(|data| !data.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("'{}' file is required", UPLOAD_FIELD)))?;

    let stt = state.registry.stt()?;
    info!("Transcription request: {} bytes", upload.len());

    let start = Instant::now();
    let wav = tokio::task::spawn_blocking(move || normalize_for_transcription(upload))
        .await
        .map_err(|e| manas_core::Error::AudioError(format!("Normalization task failed: {}", e)))
        .and_then(|result| result)
        .public_error(PUBLIC_ERROR)?;

    let text = stt.transcribe(wav).await.public_error(PUBLIC_ERROR)?;
    debug!("Transcribed in {:.0}ms", start.elapsed().as_secs_f64() * 1000.0);

    Ok(Json(TranscribeResponse {
        text: text.trim().to_string(),
    }))
}

/// Sentence-chunked speech synthesis returned as one WAV
pub async fn text_to_speech(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TextRequest>, ApiError>,
) -> Result<Response, ApiError> {
    const PUBLIC_ERROR: &str = "Failed to synthesize speech.";

    let text = require_text("text", &req.text)?;
    let tts = state.registry.tts()?;

    let start = Instant::now();
    let waveform = synthesize_chunked(tts, text)
        .await
        .public_error(PUBLIC_ERROR)?;
    info!(
        "Synthesized {:.2}s of audio in {:.0}ms",
        waveform.duration_secs(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    wav_response(&waveform).public_error(PUBLIC_ERROR)
}
