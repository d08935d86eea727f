//! On-disk persistence of a [`Session`] between runs.
//!
//! The session is written as pretty JSON after every turn so an interrupted
//! interview can be resumed with `--resume`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::interview::state::Session;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `session`, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        log::debug!("session saved to {}", self.path.display());
        Ok(())
    }

    /// Read the saved session.  A missing or unreadable file yields `None`.
    pub fn load(&self) -> Option<Session> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("session file {} unreadable: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("session file {} is malformed: {e}", self.path.display());
                None
            }
        }
    }

    /// Remove the saved session, if any.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::state::{HistoryEntry, Phase};
    use crate::llm::FeedbackPayload;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_restores_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        let mut session = Session::default();
        session.phase = Phase::Interview;
        session.warmup_turn = 2;
        session.interview_index = 1;
        session.followup_count = 1;
        session.current_question = Some("Which trade-offs?".into());
        session
            .history
            .push(HistoryEntry::new("Hi, introduce yourself?", "I'm Sam."));

        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn feedback_survives_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut session = Session::default();
        session.phase = Phase::Feedback;
        session.feedback = Some(FeedbackPayload::placeholder());

        store.save(&session).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.feedback(), Some(&FeedbackPayload::placeholder()));
    }

    #[test]
    fn missing_or_corrupt_file_loads_nothing() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());

        std::fs::write(store.path(), "{ nope").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&Session::default()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
