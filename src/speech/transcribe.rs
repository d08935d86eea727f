//! Speech-to-text over an OpenAI-compatible `/v1/audio/transcriptions`
//! endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SpeechConfig;
use crate::speech::error::SpeechError;

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Converts a recorded answer (WAV bytes) into text.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn Transcriber>`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError>;
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Uploads audio as multipart `file=audio.wav` plus `model`.
pub struct ApiTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ApiTranscriber {
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.resolved_api_key(),
            model: config.stt_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let mut req = self.client.post(self.endpoint()).multipart(form);
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Parse(e.to_string()))?;

        log::debug!("stt: {} bytes → {} chars", audio.len(), parsed.text.len());
        Ok(parsed.text.trim().to_string())
    }
}
