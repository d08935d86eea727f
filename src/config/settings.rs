//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a hand-written `settings.toml` only needs the keys
//! it wants to override.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::interview::InterviewLimits;

/// Environment variable consulted when no API key is present in the config.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

// ---------------------------------------------------------------------------
// Experience / Difficulty
// ---------------------------------------------------------------------------

/// Candidate experience level, rendered verbatim into the warmup prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Experience {
    #[default]
    Fresher,
    #[serde(rename = "1-2 years")]
    OneToTwoYears,
    #[serde(rename = "3-5 years")]
    ThreeToFiveYears,
    Senior,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Fresher,
        Experience::OneToTwoYears,
        Experience::ThreeToFiveYears,
        Experience::Senior,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Experience::Fresher => "Fresher",
            Experience::OneToTwoYears => "1-2 years",
            Experience::ThreeToFiveYears => "3-5 years",
            Experience::Senior => "Senior",
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Experience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Experience::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown experience level: {s}"))
    }
}

/// Interview difficulty, rendered verbatim into the interview prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty: {s}"))
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the chat-completion endpoint that makes interview decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API (without the `/v1` suffix).
    ///
    /// - Groq: `https://api.groq.com/openai`
    /// - OpenAI: `https://api.openai.com`
    /// - Ollama: `http://localhost:11434`
    pub base_url: String,
    /// API key: `None` falls back to the `GROQ_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature.  Decisions want low values.
    pub temperature: f32,
    /// Maximum seconds to wait for a completion before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai".into(),
            api_key: None,
            model: "meta-llama/llama-4-scout-17b-16e-instruct".into(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// The configured key, or the environment fallback.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref())
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for transcription and speech synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Synthesize interviewer questions as audio.
    pub voice_output: bool,
    /// Base URL of the OpenAI-compatible audio API.
    pub base_url: String,
    /// API key: `None` falls back to the `GROQ_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Transcription model (e.g. `"whisper-large-v3"`).
    pub stt_model: String,
    /// Speech synthesis model (e.g. `"playai-tts"`).
    pub tts_model: String,
    /// Voice name passed to the synthesis endpoint.
    pub voice: String,
    /// Maximum seconds to wait for a transcription or synthesis response.
    pub timeout_secs: u64,
    /// Local synthesizer used when the hosted one fails.
    pub local_tts: LocalTtsConfig,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice_output: true,
            base_url: "https://api.groq.com/openai".into(),
            api_key: None,
            stt_model: "whisper-large-v3".into(),
            tts_model: "playai-tts".into(),
            voice: "alloy".into(),
            timeout_secs: 60,
            local_tts: LocalTtsConfig::default(),
        }
    }
}

impl SpeechConfig {
    /// The configured key, or the environment fallback.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref())
    }
}

/// A local text-to-speech program that writes WAV audio to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalTtsConfig {
    pub enabled: bool,
    /// Executable name or path (e.g. `"espeak-ng"`).
    pub program: String,
    /// Arguments placed before the text argument.
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for LocalTtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak-ng".into(),
            args: vec!["--stdout".into()],
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// InterviewConfig
// ---------------------------------------------------------------------------

/// Defaults for a new interview session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Question-bank key of the role to practise.
    pub role: String,
    pub experience: Experience,
    pub difficulty: Difficulty,
    /// Question bank location; `None` means `<config_dir>/roles.json`.
    pub question_bank: Option<PathBuf>,
    /// Turn and question limits applied on top of model decisions.
    pub limits: InterviewLimits,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            role: "software_engineer".into(),
            experience: Experience::default(),
            difficulty: Difficulty::default(),
            question_bank: None,
            limits: InterviewLimits::default(),
        }
    }
}

impl InterviewConfig {
    /// The question bank path, resolved against the platform config dir.
    pub fn question_bank_path(&self) -> PathBuf {
        self.question_bank
            .clone()
            .unwrap_or_else(|| AppPaths::new().question_bank_file)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use interview_partner::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("practising {}", config.interview.role);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Decision model settings.
    pub llm: LlmConfig,
    /// Transcription / synthesis settings.
    pub speech: SpeechConfig,
    /// Session defaults and guardrail limits.
    pub interview: InterviewConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn resolve_api_key(configured: Option<&str>) -> Option<String> {
    match configured {
        Some(key) if !key.trim().is_empty() => Some(key.to_string()),
        _ => std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
