//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::capability::TextGenerator;
use crate::chat::ChatTurn;
use crate::config::LlmConfig;
use crate::error::{Error, Result};

// -- Wire types --

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiContent {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }
}

impl From<&ChatTurn> for GeminiContent {
    fn from(turn: &ChatTurn) -> Self {
        let role = if turn.role == "model" { "model" } else { "user" };
        Self {
            role: Some(role.to_string()),
            parts: turn
                .parts
                .iter()
                .filter_map(|p| p.text.clone())
                .map(|text| GeminiPart { text: Some(text) })
                .collect(),
        }
    }
}

impl GeminiResponse {
    /// Text of the first candidate, parts joined
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::LlmError(format!("Prompt blocked: {}", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::LlmError("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::LlmError(format!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

/// Hosted Gemini model reached over REST
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiClient {
    /// Build a client; fails when no API key is configured
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.expose_secret().trim().is_empty())
            .ok_or_else(|| Error::ConfigError("GEMINI_API_KEY not found".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_content(&self, contents: Vec<GeminiContent>) -> Result<String> {
        debug!("Gemini request with {} content turns", contents.len());

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GeminiRequest { contents })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                Error::LlmError(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini returned error");
            return Err(Error::LlmError(format!("Gemini returned {}: {}", status, body)));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::LlmError(format!("Failed to parse Gemini response: {}", e)))?;
        parsed.into_text()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(vec![GeminiContent::text("user", prompt)])
            .await
    }

    async fn chat(&self, history: &[ChatTurn], message: &str) -> Result<String> {
        let mut contents: Vec<GeminiContent> = history.iter().map(GeminiContent::from).collect();
        contents.push(GeminiContent::text("user", message));
        self.generate_content(contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new(&LlmConfig {
            api_key: Some(SecretString::from("test-key".to_owned())),
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
    }

    #[tokio::test]
    async fn test_generate_sends_single_user_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Write a poem" }] }]
            })))
            .respond_with(text_response("Roses bloom"))
            .expect(1)
            .mount(&server)
            .await;

        let text = test_client(&server.uri()).generate("Write a poem").await.unwrap();
        assert_eq!(text, "Roses bloom");
    }

    #[tokio::test]
    async fn test_chat_appends_message_after_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "hi" }] },
                    { "role": "model", "parts": [{ "text": "hello" }] },
                    { "role": "user", "parts": [{ "text": "how are you?" }] }
                ]
            })))
            .respond_with(text_response("Doing well"))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];
        let text = test_client(&server.uri())
            .chat(&history, "how are you?")
            .await
            .unwrap();
        assert_eq!(text, "Doing well");
    }

    #[tokio::test]
    async fn test_upstream_error_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).generate("hi").await;
        assert!(matches!(result, Err(Error::LlmError(msg)) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [],
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).generate("hi").await;
        assert!(matches!(result, Err(Error::LlmError(msg)) if msg.contains("SAFETY")));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            GeminiClient::new(&LlmConfig::default()),
            Err(Error::ConfigError(_))
        ));
    }
}
