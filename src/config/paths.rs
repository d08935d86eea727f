//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + question bank):
//!   Windows: %APPDATA%\interview-partner\
//!   macOS:   ~/Library/Application Support/interview-partner/
//!   Linux:   ~/.config/interview-partner/
//!
//! Data dir (saved session, synthesized audio):
//!   Windows: %LOCALAPPDATA%\interview-partner\
//!   macOS:   ~/Library/Application Support/interview-partner/
//!   Linux:   ~/.local/share/interview-partner/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `roles.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the role-keyed question bank.
    pub question_bank_file: PathBuf,
    /// Snapshot of the in-progress session, rewritten after every turn.
    pub session_file: PathBuf,
    /// Directory where synthesized interviewer audio is written.
    pub audio_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "interview-partner";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            question_bank_file: config_dir.join("roles.json"),
            session_file: data_dir.join("session.json"),
            audio_dir: data_dir.join("audio"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.audio_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .question_bank_file
            .file_name()
            .is_some_and(|n| n == "roles.json"));
        assert!(paths
            .session_file
            .file_name()
            .is_some_and(|n| n == "session.json"));
    }

    #[test]
    fn bank_lives_next_to_settings() {
        let paths = AppPaths::new();
        assert_eq!(paths.question_bank_file.parent(), paths.settings_file.parent());
    }
}
