//! Text-to-speech backends.
//!
//! * [`ApiSynthesizer`]: OpenAI-compatible `/v1/audio/speech`.  Raw audio
//!   bodies are used as-is; a JSON body carrying a base64 `audio` field is
//!   decoded.
//! * [`CommandSynthesizer`]: a local program (default `espeak-ng --stdout`)
//!   that writes WAV to stdout.  Used as the fallback.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::{LocalTtsConfig, SpeechConfig};
use crate::speech::error::SpeechError;

// ---------------------------------------------------------------------------
// SpeechAudio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        match mime {
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

/// Synthesized speech ready to be written to disk or played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EncodedAudio {
    audio: String,
}

/// Turn a `/v1/audio/speech` response body into [`SpeechAudio`].
fn decode_speech_body(content_type: Option<&str>, body: &[u8]) -> Result<SpeechAudio, SpeechError> {
    let is_json = content_type.is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        let encoded: EncodedAudio =
            serde_json::from_slice(body).map_err(|e| SpeechError::Parse(e.to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.audio.trim())
            .map_err(|e| SpeechError::Parse(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        return Ok(SpeechAudio {
            bytes,
            format: AudioFormat::Wav,
        });
    }

    if body.is_empty() {
        return Err(SpeechError::EmptyAudio);
    }
    Ok(SpeechAudio {
        bytes: body.to_vec(),
        format: content_type
            .and_then(AudioFormat::from_content_type)
            .unwrap_or(AudioFormat::Wav),
    })
}

pub struct ApiSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
}

impl ApiSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.resolved_api_key(),
            model: config.tts_model.clone(),
            voice: config.voice.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/audio/speech", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Synthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        let body = serde_json::json!({
            "model":           self.model,
            "input":           text,
            "voice":           self.voice,
            "response_format": "wav"
        });

        let mut req = self.client.post(self.endpoint()).json(&body);
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

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        decode_speech_body(content_type.as_deref(), &bytes)
    }
}

// ---------------------------------------------------------------------------
// CommandSynthesizer
// ---------------------------------------------------------------------------

/// Runs `program args... <text>` and captures WAV audio from stdout.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &LocalTtsConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(text).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| SpeechError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => return Err(SpeechError::Timeout),
        };

        if !output.status.success() {
            return Err(SpeechError::Command {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        Ok(SpeechAudio {
            bytes: output.stdout,
            format: AudioFormat::Wav,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_with_base64_audio_is_decoded() {
        let body = br#"{"audio": "UklGRg=="}"#;
        let audio = decode_speech_body(Some("application/json; charset=utf-8"), body).unwrap();
        assert_eq!(audio.bytes, b"RIFF");
        assert_eq!(audio.format, AudioFormat::Wav);
    }

    #[test]
    fn raw_body_uses_content_type_format() {
        let audio = decode_speech_body(Some("audio/mpeg"), b"ID3").unwrap();
        assert_eq!(audio.format, AudioFormat::Mp3);
        assert_eq!(audio.format.extension(), "mp3");

        let audio = decode_speech_body(None, b"RIFF").unwrap();
        assert_eq!(audio.format, AudioFormat::Wav);
    }

    #[test]
    fn empty_or_bad_bodies_are_errors() {
        assert!(matches!(
            decode_speech_body(Some("audio/wav"), b""),
            Err(SpeechError::EmptyAudio)
        ));
        assert!(matches!(
            decode_speech_body(Some("application/json"), br#"{"audio": "%%%"}"#),
            Err(SpeechError::Parse(_))
        ));
        assert!(matches!(
            decode_speech_body(Some("application/json"), br#"{"error": "x"}"#),
            Err(SpeechError::Parse(_))
        ));
    }

    #[test]
    fn api_endpoint_and_defaults() {
        let tts = ApiSynthesizer::from_config(&SpeechConfig::default());
        assert_eq!(tts.endpoint(), "https://api.groq.com/openai/v1/audio/speech");
        assert_eq!(tts.model, "playai-tts");
        assert_eq!(tts.voice, "alloy");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let tts = CommandSynthesizer::new(
            "definitely-not-a-tts-program",
            vec![],
            Duration::from_secs(2),
        );
        assert!(matches!(
            tts.synthesize("hello").await,
            Err(SpeechError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_stdout_becomes_wav_audio() {
        let tts = CommandSynthesizer::new(
            "sh",
            vec!["-c".into(), "printf 'RIFF%s' \"$1\"".into(), "tts".into()],
            Duration::from_secs(5),
        );
        let audio = tts.synthesize("hello").await.unwrap();
        assert_eq!(audio.bytes, b"RIFFhello");
        assert_eq!(audio.format, AudioFormat::Wav);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let tts = CommandSynthesizer::new(
            "sh",
            vec!["-c".into(), "echo broken >&2; exit 3".into(), "tts".into()],
            Duration::from_secs(5),
        );
        match tts.synthesize("hello").await {
            Err(SpeechError::Command { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("expected command error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let tts = CommandSynthesizer::new(
            "sh",
            vec!["-c".into(), "sleep 5".into(), "tts".into()],
            Duration::from_millis(100),
        );
        assert!(matches!(
            tts.synthesize("hello").await,
            Err(SpeechError::Timeout)
        ));
    }
}
