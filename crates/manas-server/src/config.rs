//! Configuration loading: optional TOML file, then environment overrides

use config::{Config, Environment, File, Map};
use manas_core::ManasConfig;
use secrecy::SecretString;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "manas.toml";

/// Load configuration from `MANAS_CONFIG` (or `manas.toml`) and
/// `MANAS__SECTION__KEY` environment variables.
pub fn load() -> anyhow::Result<ManasConfig> {
    let path = std::env::var("MANAS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    info!("Reading configuration from {} (if present)", path);

    let mut config = load_layered(&path, None)?;
    apply_legacy_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// File then environment. `env` replaces the process environment when set.
fn load_layered(path: &str, env: Option<Map<String, String>>) -> anyhow::Result<ManasConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("MANAS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .source(env),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Honour the plain `GEMINI_API_KEY` / `HUGGING_FACE_TOKEN` variables when
/// the structured keys are not set
fn apply_legacy_env(config: &mut ManasConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if config.llm.api_key.is_none() {
        config.llm.api_key = non_blank("GEMINI_API_KEY").map(SecretString::from);
    }
    if config.models.hf_token.is_none() {
        config.models.hf_token = non_blank("HUGGING_FACE_TOKEN").map(SecretString::from);
    }
}
