//! NLQ Client for LLM interactions

use crate::config::NLQConfig;
use crate::nlq::{NLQError, NLQResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A chat-style completion service: one system message, one user message,
/// text back.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> NLQResult<String>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAIClient {
    client: Client,
    config: NLQConfig,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

impl OpenAIClient {
    /// Create a client. No request timeout is set; the HTTP client's
    /// defaults apply.
    pub fn new(config: &NLQConfig) -> NLQResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| NLQError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> NLQResult<String> {
        let url = format!("{}/chat/completions", self.config.api_base_url);
        debug!(model = %self.config.model, "Requesting chat completion");

        let resp = self.client.post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message { role: "system", content: system_prompt },
                    Message { role: "user", content: user_prompt },
                ],
                temperature: self.config.temperature,
            })
            .send()
            .await
            .map_err(|e| NLQError::NetworkError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NLQError::ApiError(format!("OpenAI error ({}): {}", status, body)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| NLQError::SerializationError(e.to_string()))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| NLQError::SerializationError("Completion returned no content".to_string()))
    }
}
