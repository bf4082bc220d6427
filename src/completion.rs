//! Text-completion service used by the generator, scanner and replacement
//! stages.
//!
//! Completions are treated as unreliable: callers must be prepared for
//! errors, empty responses and malformed JSON.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config;
use crate::error::{ForgeError, Result};

/// A prompt-in, text-out language model.
pub trait CompletionService: Send + Sync {
    fn complete(&self, system_prompt: &str, user_prompt: &str, max_tokens: u32) -> Result<String>;
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// Chat-completions client for the OpenAI API.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client. Fails with [`ForgeError::Configuration`] if the key is
    /// blank.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ForgeError::Configuration(
                "OpenAI API key not configured".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config::USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            endpoint: config::OPENAI_ENDPOINT.to_string(),
        })
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let key = std::env::var(config::API_KEY_ENV).map_err(|_| {
            ForgeError::Configuration(format!("{} is not set", config::API_KEY_ENV))
        })?;
        Self::new(key, model, timeout)
    }

    /// Point the client at a compatible endpoint (proxies, local servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionService for OpenAiClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str, max_tokens: u32) -> Result<String> {
        debug!(model = %self.model, max_tokens, "Requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature: 0.7,
        };

        let response: ChatResponse = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(chars = content.len(), "Completion received");
        Ok(content)
    }
}
