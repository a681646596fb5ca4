//! Model registry: the set of external capabilities available to handlers
//!
//! Built once at startup and never mutated afterwards. Each capability is
//! initialized on its own, so one failing model leaves the others usable.

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::capability::{
    AudioGenerator, IntentClassifier, QuestionAnswerer, SpeechRecognizer, SpeechSynthesizer,
    TextGenerator,
};
use crate::config::{ManasConfig, ModelsConfig};
use crate::error::{Error, Result};
use crate::inference::{DaemonClient, DaemonPipeline, InferencePool};
use crate::llm::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Intent,
    QuestionAnswering,
    TextToSpeech,
    SpeechToText,
    AudioGeneration,
    Llm,
}

impl Capability {
    pub fn all() -> &'static [Capability] {
        &[
            Capability::Intent,
            Capability::QuestionAnswering,
            Capability::TextToSpeech,
            Capability::SpeechToText,
            Capability::AudioGeneration,
            Capability::Llm,
        ]
    }

    /// Identifier used on the daemon wire and in health output
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Intent => "intent",
            Capability::QuestionAnswering => "qa",
            Capability::TextToSpeech => "tts",
            Capability::SpeechToText => "stt",
            Capability::AudioGeneration => "audio_generation",
            Capability::Llm => "llm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Capability::Intent => "Intent",
            Capability::QuestionAnswering => "QA",
            Capability::TextToSpeech => "TTS",
            Capability::SpeechToText => "Speech-to-Text",
            Capability::AudioGeneration => "Audio generation",
            Capability::Llm => "Gemini",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable handles to every external capability
#[derive(Clone, Default)]
pub struct ModelRegistry {
    intent: Option<Arc<dyn IntentClassifier>>,
    qa: Option<Arc<dyn QuestionAnswerer>>,
    tts: Option<Arc<dyn SpeechSynthesizer>>,
    stt: Option<Arc<dyn SpeechRecognizer>>,
    audio_gen: Option<Arc<dyn AudioGenerator>>,
    llm: Option<Arc<dyn TextGenerator>>,
}

impl ModelRegistry {
    /// Registry with nothing loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Initialize every capability from configuration.
    ///
    /// Never fails: a capability that cannot be initialized is logged and
    /// left absent.
    pub async fn load(config: &ManasConfig) -> Self {
        let llm = match GeminiClient::new(&config.llm) {
            Ok(client) => {
                info!("Gemini model configured ({})", config.llm.model);
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("Gemini unavailable: {}. AI features will fail.", e);
                None
            }
        };

        let pool = InferencePool::new(&config.inference);
        let client = Arc::new(DaemonClient::new(&config.models));

        let starter = client.clone();
        let daemon_ready = match tokio::task::spawn_blocking(move || starter.ensure_running()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Pipeline daemon unavailable, local models disabled: {}", e);
                false
            }
            Err(e) => {
                warn!("Pipeline daemon startup task failed: {}", e);
                false
            }
        };

        let mut registry = Self::empty();
        if let Some(llm) = llm {
            registry = registry.with_llm(llm);
        }
        if !daemon_ready {
            return registry;
        }

        let pipelines = [
            Capability::Intent,
            Capability::QuestionAnswering,
            Capability::TextToSpeech,
            Capability::SpeechToText,
            Capability::AudioGeneration,
        ];
        let loads = pipelines.iter().map(|&capability| {
            let options = load_options(capability, &config.models);
            let client = client.clone();
            let pool = pool.clone();
            async move {
                let result = DaemonPipeline::load(capability, client, pool, options).await;
                (capability, result)
            }
        });

        for (capability, result) in futures::future::join_all(loads).await {
            match result {
                Ok(pipeline) => {
                    let pipeline = Arc::new(pipeline);
                    registry = match capability {
                        Capability::Intent => registry.with_intent(pipeline),
                        Capability::QuestionAnswering => registry.with_qa(pipeline),
                        Capability::TextToSpeech => registry.with_tts(pipeline),
                        Capability::SpeechToText => registry.with_stt(pipeline),
                        Capability::AudioGeneration => registry.with_audio_gen(pipeline),
                        Capability::Llm => registry,
                    };
                }
                Err(e) => warn!("{} model failed to load: {}", capability.display_name(), e),
            }
        }

        registry
    }

    pub fn with_intent(mut self, handle: Arc<dyn IntentClassifier>) -> Self {
        self.intent = Some(handle);
        self
    }

    pub fn with_qa(mut self, handle: Arc<dyn QuestionAnswerer>) -> Self {
        self.qa = Some(handle);
        self
    }

    pub fn with_tts(mut self, handle: Arc<dyn SpeechSynthesizer>) -> Self {
        self.tts = Some(handle);
        self
    }

    pub fn with_stt(mut self, handle: Arc<dyn SpeechRecognizer>) -> Self {
        self.stt = Some(handle);
        self
    }

    pub fn with_audio_gen(mut self, handle: Arc<dyn AudioGenerator>) -> Self {
        self.audio_gen = Some(handle);
        self
    }

    pub fn with_llm(mut self, handle: Arc<dyn TextGenerator>) -> Self {
        self.llm = Some(handle);
        self
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        match capability {
            Capability::Intent => self.intent.is_some(),
            Capability::QuestionAnswering => self.qa.is_some(),
            Capability::TextToSpeech => self.tts.is_some(),
            Capability::SpeechToText => self.stt.is_some(),
            Capability::AudioGeneration => self.audio_gen.is_some(),
            Capability::Llm => self.llm.is_some(),
        }
    }

    pub fn availability(&self) -> BTreeMap<&'static str, bool> {
        Capability::all()
            .iter()
            .map(|c| (c.as_str(), self.is_available(*c)))
            .collect()
    }

    pub fn intent(&self) -> Result<&dyn IntentClassifier> {
        require(&self.intent, Capability::Intent)
    }

    pub fn qa(&self) -> Result<&dyn QuestionAnswerer> {
        require(&self.qa, Capability::QuestionAnswering)
    }

    pub fn tts(&self) -> Result<&dyn SpeechSynthesizer> {
        require(&self.tts, Capability::TextToSpeech)
    }

    pub fn stt(&self) -> Result<&dyn SpeechRecognizer> {
        require(&self.stt, Capability::SpeechToText)
    }

    pub fn audio_gen(&self) -> Result<&dyn AudioGenerator> {
        require(&self.audio_gen, Capability::AudioGeneration)
    }

    pub fn llm(&self) -> Result<&dyn TextGenerator> {
        require(&self.llm, Capability::Llm)
    }
}

fn require<T: ?Sized>(slot: &Option<Arc<T>>, capability: Capability) -> Result<&T> {
    slot.as_deref().ok_or(Error::ModelNotLoaded(capability))
}

/// Model ids and options sent with the daemon `load` command
fn load_options(capability: Capability, models: &ModelsConfig) -> serde_json::Value {
    use secrecy::ExposeSecret;

    let mut options = match capability {
        Capability::Intent => json!({ "model": models.intent_model }),
        Capability::QuestionAnswering => json!({ "model": models.qa_model }),
        Capability::TextToSpeech => json!({
            "model": models.tts_model,
            "vocoder": models.tts_vocoder,
            "speaker_embedding": {
                "dataset": models.speaker_dataset,
                "index": models.speaker_index,
            },
        }),
        Capability::SpeechToText => json!({ "model": models.stt_model }),
        Capability::AudioGeneration => json!({
            "model": models.music_model,
            "max_new_tokens": models.music_max_new_tokens,
        }),
        Capability::Llm => json!({}),
    };

    if let Some(token) = &models.hf_token {
        options["hf_token"] = json!(token.expose_secret());
    }
    options
}
