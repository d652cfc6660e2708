//! ChatApiGenerator - OpenAI-compatible chat completion backend.
//!
//! Talks to any `/chat/completions` endpoint (OpenAI, Zhipu, local
//! gateways) over plain REST. The engine imposes its own per-call deadline;
//! the client carries a matching transport timeout so a dead socket cannot
//! outlive it.

use async_trait::async_trait;
use parley_core::generate::{ChatMessage, GenerationError, TextGenerator};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeneratorConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_TEMPERATURE: f32 = 0.8;
const DEFAULT_MAX_TOKENS: u32 = 160;
const DEFAULT_TOP_P: f32 = 0.9;

/// Backend implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct ChatApiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatApiGenerator {
    /// Creates a generator with the provided API key, model, and base URL.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Builds a generator from loaded configuration.
    pub fn from_config(config: GeneratorConfig) -> Self {
        Self::new(config.api_key, config.model, config.base_url)
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the reply length budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatApiGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(ChatMessage::system(system_prompt));
        wire.extend_from_slice(messages);

        let body = CompletionRequest {
            model: &self.model,
            messages: wire,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: DEFAULT_TOP_P,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GenerationError::Timeout(REQUEST_TIMEOUT.as_secs())
                } else {
                    GenerationError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "chat API rejected the request");
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => GenerationError::Api {
                    status: status.as_u16(),
                    message: "rate limited by backend".to_string(),
                },
                _ => GenerationError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidResponse("response carried no message content".to_string())
            })
    }
}
