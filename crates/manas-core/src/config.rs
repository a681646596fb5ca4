//! Configuration types for the Manas backend

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration, one section per subsystem
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManasConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub geo: GeoConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. The literal `null` admits `file://` pages.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Directory holding `index.html` and the `/static` assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8000".to_string(),
        "https://127.0.0.1:8000".to_string(),
        "http://127.0.0.1:8000".to_string(),
        "null".to_string(),
    ]
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

/// Hosted LLM (Gemini) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key; the client is left unloaded when absent
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

/// Local model pipelines served by the pipeline daemon
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Script spawned when no daemon is listening on `socket_path`, run as
    /// `<python_cmd> <script> --socket <socket_path>`. It must answer the
    /// JSON commands `check`, `load`, `classify`, `answer`, `synthesize`,
    /// `transcribe` and `generate_audio`, each framed by a 4-byte big-endian
    /// length. Without a script or a running daemon the local capabilities
    /// stay unavailable.
    ///
    /// ```toml
    /// [models]
    /// daemon_script = "scripts/pipeline_daemon.py"
    /// ```
    #[serde(default)]
    pub daemon_script: Option<PathBuf>,

    #[serde(default = "default_python_cmd")]
    pub python_cmd: String,

    /// Seconds to wait for an autostarted daemon to answer `check`
    #[serde(default = "default_daemon_startup_secs")]
    pub daemon_startup_secs: u64,

    #[serde(default)]
    pub hf_token: Option<SecretString>,

    #[serde(default = "default_intent_model")]
    pub intent_model: String,

    #[serde(default = "default_qa_model")]
    pub qa_model: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_tts_vocoder")]
    pub tts_vocoder: String,

    #[serde(default = "default_speaker_dataset")]
    pub speaker_dataset: String,

    #[serde(default = "default_speaker_index")]
    pub speaker_index: usize,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    #[serde(default = "default_music_model")]
    pub music_model: String,

    /// Audio tokens generated per soundscape
    #[serde(default = "default_music_max_new_tokens")]
    pub music_max_new_tokens: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            daemon_script: None,
            python_cmd: default_python_cmd(),
            daemon_startup_secs: default_daemon_startup_secs(),
            hf_token: None,
            intent_model: default_intent_model(),
            qa_model: default_qa_model(),
            tts_model: default_tts_model(),
            tts_vocoder: default_tts_vocoder(),
            speaker_dataset: default_speaker_dataset(),
            speaker_index: default_speaker_index(),
            stt_model: default_stt_model(),
            music_model: default_music_model(),
            music_max_new_tokens: default_music_max_new_tokens(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/manas_pipeline_daemon.sock")
}

fn default_python_cmd() -> String {
    "python3".to_string()
}

fn default_daemon_startup_secs() -> u64 {
    120
}

fn default_intent_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_qa_model() -> String {
    "distilbert-base-cased-distilled-squad".to_string()
}

fn default_tts_model() -> String {
    "microsoft/speecht5_tts".to_string()
}

fn default_tts_vocoder() -> String {
    "microsoft/speecht5_hifigan".to_string()
}

fn default_speaker_dataset() -> String {
    "Matthijs/cmu-arctic-xvectors-slt".to_string()
}

fn default_speaker_index() -> usize {
    7306
}

fn default_stt_model() -> String {
    "openai/whisper-base".to_string()
}

fn default_music_model() -> String {
    "facebook/musicgen-small".to_string()
}

fn default_music_max_new_tokens() -> u32 {
    256
}

/// Bounds for the blocking inference pool
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Jobs allowed on the device at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Jobs allowed in the pool (running + waiting) before rejecting
    #[serde(default = "default_max_queued")]
    pub max_queued: usize,

    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            max_queued: default_max_queued(),
            job_timeout_secs: default_job_timeout_secs(),
        }
    }
}

fn default_max_concurrent() -> usize {
    1
}

fn default_max_queued() -> usize {
    16
}

fn default_job_timeout_secs() -> u64 {
    180
}

/// Overpass map-data lookup
#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_geo_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    #[serde(default = "default_geo_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geo_endpoint(),
            radius_m: default_radius_m(),
            timeout_secs: default_geo_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

fn default_geo_endpoint() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_radius_m() -> u32 {
    1500
}

fn default_geo_timeout_secs() -> u64 {
    10
}

fn default_max_results() -> usize {
    5
}
