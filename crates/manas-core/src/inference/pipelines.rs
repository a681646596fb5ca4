//! Capability implementations backed by the pipeline daemon

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use super::daemon::DaemonClient;
use super::pool::InferencePool;
use crate::audio::{decode_wav_bytes, Waveform};
use crate::capability::{
    Answer, AudioGenerator, IntentClassifier, IntentScores, QuestionAnswerer, SpeechRecognizer,
    SpeechSynthesizer,
};
use crate::error::{Error, Result};
use crate::registry::Capability;

#[derive(Debug, Deserialize)]
struct AudioResponse {
    audio_base64: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    #[serde(default)]
    device: Option<String>,
}

/// A pipeline loaded inside the daemon, reached through the inference pool
pub struct DaemonPipeline {
    capability: Capability,
    client: Arc<DaemonClient>,
    pool: InferencePool,
    max_new_tokens: Option<u32>,
}

impl DaemonPipeline {
    /// Ask the daemon to load the pipeline for `capability`.
    ///
    /// `options` carries the model ids and settings for that capability.
    pub async fn load(
        capability: Capability,
        client: Arc<DaemonClient>,
        pool: InferencePool,
        options: serde_json::Value,
    ) -> Result<Self> {
        let max_new_tokens = options
            .get("max_new_tokens")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32);

        let mut payload = options;
        payload["capability"] = json!(capability.as_str());

        let loader = client.clone();
        let response = tokio::task::spawn_blocking(move || {
            loader.call_typed::<LoadResponse>("load", payload)
        })
        .await
        .map_err(|e| Error::DaemonError(format!("Load task failed: {}", e)))??;

        info!(
            "{} pipeline loaded on {}",
            capability.display_name(),
            response.device.as_deref().unwrap_or("default device")
        );

        Ok(Self {
            capability,
            client,
            pool,
            max_new_tokens,
        })
    }

    async fn call<T>(&self, command: &'static str, payload: serde_json::Value) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let mut payload = payload;
        payload["capability"] = json!(self.capability.as_str());

        let client = self.client.clone();
        self.pool
            .run(command, move || client.call_typed::<T>(command, payload))
            .await
    }

    async fn call_for_audio(&self, command: &'static str, payload: serde_json::Value) -> Result<Waveform> {
        let response: AudioResponse = self.call(command, payload).await?;
        let wav_bytes = base64::engine::general_purpose::STANDARD
            .decode(response.audio_base64.as_bytes())
            .map_err(|e| Error::InferenceError(format!("Failed to decode audio: {}", e)))?;

        let waveform = decode_wav_bytes(&wav_bytes)?;
        debug!(
            "{} produced {:.2}s at {} Hz",
            self.capability.display_name(),
            waveform.duration_secs(),
            waveform.sample_rate
        );
        Ok(waveform)
    }
}

#[async_trait]
impl IntentClassifier for DaemonPipeline {
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<IntentScores> {
        self.call(
            "classify",
            json!({ "text": text, "candidate_labels": candidate_labels }),
        )
        .await
    }
}

#[async_trait]
impl QuestionAnswerer for DaemonPipeline {
    async fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        self.call("answer", json!({ "question": question, "context": context }))
            .await
    }
}

#[async_trait]
impl SpeechSynthesizer for DaemonPipeline {
    async fn synthesize(&self, text: &str) -> Result<Waveform> {
        self.call_for_audio("synthesize", json!({ "text": text }))
            .await
    }
}

#[async_trait]
impl SpeechRecognizer for DaemonPipeline {
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> Result<String> {
        let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&wav_bytes);
        let response: TranscriptionResponse = self
            .call("transcribe", json!({ "audio_base64": audio_base64 }))
            .await?;
        Ok(response.text)
    }
}

#[async_trait]
impl AudioGenerator for DaemonPipeline {
    async fn generate(&self, prompt: &str) -> Result<Waveform> {
        self.call_for_audio(
            "generate_audio",
            json!({ "prompt": prompt, "max_new_tokens": self.max_new_tokens }),
        )
        .await
    }
}
