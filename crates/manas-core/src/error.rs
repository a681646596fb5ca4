//! Error types for the Manas core library

use thiserror::Error;

use crate::registry::Capability;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{} model not loaded.", .0.display_name())]
    ModelNotLoaded(Capability),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio processing error: {0}")]
    AudioError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Pipeline daemon error: {0}")]
    DaemonError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Geo lookup error: {0}")]
    GeoError(String),

    #[error("Inference queue is full")]
    Overloaded,

    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::AudioError(e.to_string())
    }
}

impl From<symphonia::core::errors::Error> for Error {
    fn from(e: symphonia::core::errors::Error) -> Self {
        Error::AudioError(e.to_string())
    }
}
