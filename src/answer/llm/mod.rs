
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::ArchiveError;
use crate::config::LlmConfig;
use crate::http::{build_agent, send_with_retry};

/// A text-in, text-out language model
pub trait ChatModel {
    /// Generate a completion for a single user prompt
    fn complete(&self, prompt: &str) -> crate::Result<String>;
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: Url,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Build a client from configuration. Fails when no API key is available.
    #[inline]
    pub fn new(config: &LlmConfig) -> crate::Result<Self> {
        let endpoint = config.endpoint_url()?;
        let api_key = config.api_key()?;

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one prompt as a single user message and return the generated text
    #[inline]
    pub fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        debug!(
            "Requesting completion from {} (model {}, prompt {} chars)",
            self.endpoint,
            self.model,
            prompt.len()
        );

        // One attempt: API failures are reported to the user, never retried
        let response_text = send_with_retry(self.endpoint.as_str(), 1, || {
            self.agent
                .post(self.endpoint.as_str())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Chat completion request failed")?;

        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .context("Chat response contained no choices")?
            .message
            .content
            .unwrap_or_default();

        info!("Received completion of {} chars", content.len());
        Ok(content)
    }
}

impl ChatModel for ChatClient {
    #[inline]
    fn complete(&self, prompt: &str) -> crate::Result<String> {
        self.chat(prompt)
            .map_err(|e| ArchiveError::Llm(format!("{:#}", e)))
    }
}
