use tracing::debug;

use super::segment::split_sentences;
use super::waveform::Waveform;
use crate::capability::SpeechSynthesizer;
use crate::error::{Error, Result};

/// Synthesize `text` sentence by sentence and join the waveforms in order.
///
/// Chunks are synthesized independently; no prosody context carries across
/// sentence boundaries.
pub async fn synthesize_chunked(tts: &dyn SpeechSynthesizer, text: &str) -> Result<Waveform> {
    let chunks = split_sentences(text);
    if chunks.is_empty() {
        return Err(Error::InvalidInput("Text has nothing to speak".to_string()));
    }

    debug!("Synthesizing {} sentence chunks", chunks.len());

    let mut parts = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        parts.push(tts.synthesize(chunk).await?);
    }

    Waveform::concat(parts)
}
