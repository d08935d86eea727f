//! Speech gateway: the only speech surface the front end talks to.
//!
//! Neither direction ever fails outward.  Transcription errors become an
//! in-band `"[STT error: ...]"` transcript; synthesis tries the hosted
//! backend, then the local one, then yields `None`.

use std::sync::Arc;

use crate::config::SpeechConfig;
use crate::speech::error::SpeechError;
use crate::speech::synthesize::{ApiSynthesizer, CommandSynthesizer, SpeechAudio, Synthesizer};
use crate::speech::transcribe::{ApiTranscriber, Transcriber};

const NOT_CONFIGURED: &str = "transcription client not configured";

/// Format a transcription failure as the transcript recorded for the turn.
pub fn stt_error_marker(reason: &str) -> String {
    format!("[STT error: {reason}]")
}

#[derive(Default, Clone)]
pub struct SpeechGateway {
    transcriber: Option<Arc<dyn Transcriber>>,
    primary: Option<Arc<dyn Synthesizer>>,
    fallback: Option<Arc<dyn Synthesizer>>,
}

impl SpeechGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire hosted backends when an API key is available and the local
    /// synthesizer when enabled.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let mut gateway = Self::new();

        if config.resolved_api_key().is_some() {
            gateway = gateway
                .with_transcriber(Arc::new(ApiTranscriber::from_config(config)))
                .with_primary(Arc::new(ApiSynthesizer::from_config(config)));
        } else {
            log::warn!("speech: no API key configured; hosted STT/TTS disabled");
        }

        if config.local_tts.enabled {
            gateway = gateway.with_fallback(Arc::new(CommandSynthesizer::from_config(
                &config.local_tts,
            )));
        }

        gateway
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_primary(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.primary = Some(synthesizer);
        self
    }

    pub fn with_fallback(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.fallback = Some(synthesizer);
        self
    }

    pub fn can_transcribe(&self) -> bool {
        self.transcriber.is_some()
    }

    /// Transcribe `audio`, surfacing the error.
    pub async fn try_transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        match self.transcriber.as_ref() {
            Some(transcriber) => transcriber.transcribe(audio).await,
            None => Err(SpeechError::Request(NOT_CONFIGURED.to_string())),
        }
    }

    /// Transcribe `audio`; failures come back as a bracketed marker.
    pub async fn transcribe(&self, audio: &[u8]) -> String {
        let Some(transcriber) = self.transcriber.as_ref() else {
            return stt_error_marker(NOT_CONFIGURED);
        };
        match transcriber.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("speech: transcription failed: {e}");
                stt_error_marker(&e.to_string())
            }
        }
    }

    /// Synthesize `text`, trying the primary then the fallback backend.
    pub async fn synthesize(&self, text: &str) -> Option<SpeechAudio> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        for (label, backend) in [("primary", &self.primary), ("fallback", &self.fallback)] {
            let Some(backend) = backend else { continue };
            match backend.synthesize(text).await {
                Ok(audio) => return Some(audio),
                Err(e) => log::warn!("speech: {label} synthesis failed: {e}"),
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::speech::synthesize::AudioFormat;

    struct FixedTranscriber(Result<&'static str, ()>);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio: &[u8]) -> Result<String, SpeechError> {
            self.0
                .map(str::to_string)
                .map_err(|_| SpeechError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
        }
    }

    /// Returns fixed audio (or fails) and counts calls.
    struct CountingSynth {
        audio: Option<SpeechAudio>,
        calls: AtomicUsize,
    }

    impl CountingSynth {
        fn ok(bytes: &[u8], format: AudioFormat) -> Arc<Self> {
            Arc::new(Self {
                audio: Some(SpeechAudio {
                    bytes: bytes.to_vec(),
                    format,
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                audio: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Synthesizer for CountingSynth {
        async fn synthesize(&self, _text: &str) -> Result<SpeechAudio, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.audio.clone().ok_or(SpeechError::Timeout)
        }
    }

    #[tokio::test]
    async fn transcript_passes_through() {
        let gateway = SpeechGateway::new().with_transcriber(Arc::new(FixedTranscriber(Ok("hi"))));
        assert_eq!(gateway.transcribe(b"RIFF").await, "hi");
    }

    #[tokio::test]
    async fn transcription_failure_becomes_marker() {
        let gateway = SpeechGateway::new().with_transcriber(Arc::new(FixedTranscriber(Err(()))));
        let text = gateway.transcribe(b"RIFF").await;
        assert!(text.starts_with("[STT error: "), "{text}");
        assert!(text.contains("503"));
        assert!(gateway.try_transcribe(b"RIFF").await.is_err());
    }

    #[tokio::test]
    async fn unconfigured_transcriber_marker() {
        let gateway = SpeechGateway::new();
        assert!(!gateway.can_transcribe());
        assert_eq!(
            gateway.transcribe(b"RIFF").await,
            "[STT error: transcription client not configured]"
        );
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = CountingSynth::ok(b"RIFF", AudioFormat::Wav);
        let fallback = CountingSynth::ok(b"ID3", AudioFormat::Mp3);
        let gateway = SpeechGateway::new()
            .with_primary(primary.clone())
            .with_fallback(fallback.clone());

        let audio = gateway.synthesize("Hello").await.unwrap();
        assert_eq!(audio.format, AudioFormat::Wav);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn primary_failure_uses_fallback() {
        let primary = CountingSynth::failing();
        let fallback = CountingSynth::ok(b"ID3", AudioFormat::Mp3);
        let gateway = SpeechGateway::new()
            .with_primary(primary.clone())
            .with_fallback(fallback.clone());

        let audio = gateway.synthesize("Hello").await.unwrap();
        assert_eq!(audio.bytes, b"ID3");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn both_failing_yields_none() {
        let gateway = SpeechGateway::new()
            .with_primary(CountingSynth::failing())
            .with_fallback(CountingSynth::failing());
        assert!(gateway.synthesize("Hello").await.is_none());
        assert!(SpeechGateway::new().synthesize("Hello").await.is_none());
    }

    #[tokio::test]
    async fn blank_text_is_not_synthesized() {
        let primary = CountingSynth::ok(b"RIFF", AudioFormat::Wav);
        let gateway = SpeechGateway::new().with_primary(primary.clone());
        assert!(gateway.synthesize("   ").await.is_none());
        assert_eq!(primary.calls(), 0);
    }
}
