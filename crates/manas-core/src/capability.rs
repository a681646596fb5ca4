//! Traits for the external capabilities the handlers depend on
//!
//! Each capability is backed by a pre-built model pipeline or a remote API.
//! Handlers only see these traits, so tests can swap in fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::chat::ChatTurn;
use crate::error::Result;

/// Zero-shot classification output, labels sorted by descending score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScores {
    pub sequence: String,
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

/// Extractive question-answering output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<IntentScores>;
}

#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> Result<Answer>;
}

/// Synthesizes one chunk of text with a fixed speaker voice
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Waveform>;
}

/// Transcribes 16 kHz mono PCM WAV bytes
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> Result<String>;
}

/// Text-conditioned music / ambience generation
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Waveform>;
}

/// Hosted LLM text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single-shot generation from one prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Continue a conversation: `history` is prior context, `message` the new user turn
    async fn chat(&self, history: &[ChatTurn], message: &str) -> Result<String>;
}
