//! Speech module: transcription of recorded answers and synthesis of
//! interviewer prompts.
//!
//! ```text
//! answer.wav ──▶ Transcriber (hosted) ──▶ transcript | "[STT error: ...]"
//! question   ──▶ Synthesizer (hosted) ──fail──▶ Synthesizer (local) ──fail──▶ None
//! ```
//!
//! [`SpeechGateway`] is the façade used by the front end.

pub mod error;
pub mod gateway;
pub mod synthesize;
pub mod transcribe;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::SpeechError;
pub use gateway::{stt_error_marker, SpeechGateway};
pub use synthesize::{ApiSynthesizer, AudioFormat, CommandSynthesizer, SpeechAudio, Synthesizer};
pub use transcribe::{ApiTranscriber, Transcriber};
