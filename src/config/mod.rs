//! Configuration module for the interview practice partner.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, Difficulty, Experience, InterviewConfig, LlmConfig, LocalTtsConfig, SpeechConfig,
    API_KEY_ENV,
};
