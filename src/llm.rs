use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::types::{AggregatorError, Result};

/// Model calls get a longer leash than feed fetches.
const MODEL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Minimal client for an OpenAI-compatible chat-completions endpoint.
/// Constructed only when a credential is configured; its absence selects
/// the deterministic fallback paths instead.
pub struct LlmClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl LlmClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            client: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One chat-completion round trip. Any transport, quota, or shape
    /// problem surfaces as `ModelCallFailed`; callers decide how to degrade.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        debug!("model call: {} ({} messages)", self.model, body.messages.len());

        let response = tokio::time::timeout(
            MODEL_TIMEOUT,
            self.client
                .post(&self.base_url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| AggregatorError::ModelCallFailed("request timed out".to_string()))?
        .map_err(|e| AggregatorError::ModelCallFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AggregatorError::ModelCallFailed(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AggregatorError::ModelCallFailed(format!("unparsable response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AggregatorError::ModelCallFailed("response has no choices".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Pull a JSON payload out of model text that may wrap it in markdown fences
/// or preamble.
pub fn extract_json(text: &str) -> Option<String> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    // Last resort: widest brace or bracket span.
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    None
}
