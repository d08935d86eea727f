//! Core `ChatClient` trait and `ApiChatClient` implementation.
//!
//! `ApiChatClient` calls any OpenAI-compatible `/v1/chat/completions` endpoint,
//! such as Groq, OpenAI, Ollama (OpenAI mode), LM Studio, vLLM, etc.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.
//!
//! Calls are single-shot: no conversation state is held by the provider, the
//! rendered prompt carries the full interview history every time.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while requesting a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatClient trait
// ---------------------------------------------------------------------------

/// Async trait for single-shot chat completions.
///
/// Implementors must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn ChatClient>`.
///
/// # Arguments
/// * `system`      – System message (the interviewer persona and JSON rules).
/// * `user`        – Fully rendered per-phase prompt.
/// * `temperature` – Sampling temperature for this call.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str, temperature: f32)
        -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiChatClient
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiChatClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl ApiChatClient {
    /// Build an `ApiChatClient` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`, so a hung endpoint cannot stall a turn forever.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key: config.resolved_api_key(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatClient for ApiChatClient {
    /// The `Authorization: Bearer …` header is attached only when an API key
    /// is available: safe for local providers that require no
    /// authentication.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "stream":      false,
            "temperature": temperature
        });

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        log::debug!("llm: completion received ({} bytes)", content.len());
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
