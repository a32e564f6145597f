//! Chat model client - integration with an OpenAI-style chat-completions
//! endpoint. The request is the ordered list of role/content turns; the
//! response is the raw assistant text (contract parsing happens elsewhere).

use crate::config::AssistantConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One conversation turn on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Chat-completions API client
pub struct ModelClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    client: Client,
}

impl ModelClient {
    /// Create a client from the runtime config. The request timeout is set
    /// on the HTTP client, so a hung endpoint surfaces as an upstream error
    /// at the call boundary.
    pub fn new(config: &AssistantConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            client,
        }
    }

    /// Send the message list and return the assistant's raw text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("model API key not configured")?;
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            // low temperature keeps the structured output stable
            temperature: 0.1,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to model endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "model endpoint returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            );
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse model response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("model response contained no choices")?;
        Ok(content.trim().to_string())
    }
}
