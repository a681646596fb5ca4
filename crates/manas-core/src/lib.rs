//! Manas Core - capabilities behind the Manas wellness companion
//!
//! This crate holds everything the HTTP server calls into: the model
//! registry, the bridge to locally hosted ML pipelines, the hosted LLM
//! client, prompt templates, audio conversion and the geo lookup.
//!
//! # Architecture
//!
//! - [`registry::ModelRegistry`] is built once at startup and holds an
//!   optional handle per capability
//! - Local pipelines live in a helper daemon reached over a Unix socket,
//!   with every blocking call going through a bounded [`inference::InferencePool`]
//! - [`llm::GeminiClient`] talks to the hosted Gemini REST API
//!
//! # Example
//!
//! ```ignore
//! use manas_core::{ManasConfig, ModelRegistry};
//!
//! let registry = ModelRegistry::load(&ManasConfig::default()).await;
//! let poem = registry.llm()?.generate("A poem about rain").await?;
//! ```

pub mod audio;
pub mod capability;
pub mod chat;
pub mod config;
pub mod error;
pub mod geo;
pub mod inference;
pub mod llm;
pub mod prompts;
pub mod registry;

pub use config::ManasConfig;
pub use error::{Error, Result};
pub use registry::{Capability, ModelRegistry};
