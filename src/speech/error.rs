use thiserror::Error;

/// All errors that can arise from transcription or synthesis.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("speech endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("failed to parse speech response: {0}")]
    Parse(String),

    /// No audio was supplied, or none came back.
    #[error("no audio data")]
    EmptyAudio,

    /// The local synthesizer could not be started.
    #[error("failed to run `{program}`: {reason}")]
    Spawn { program: String, reason: String },

    /// The local synthesizer exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}
