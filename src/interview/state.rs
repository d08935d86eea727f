//! Session state for one interview attempt.
//!
//! [`Session`] is a plain, serializable value owned by the caller and passed
//! `&mut` into the [`Interviewer`](super::Interviewer) for each turn.  Only
//! the interview module mutates it; the presentation layer reads it through
//! accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, Experience, InterviewConfig};
use crate::llm::FeedbackPayload;

/// Warmup questions asked before the interview starts, at most.
pub const MAX_WARMUP_TURNS: u32 = 3;
/// Base questions that must be reached before an `end` decision is honoured.
pub const MIN_INTERVIEW_QUESTIONS: u32 = 3;
/// Base questions asked at most; the session moves to feedback afterwards.
pub const MAX_INTERVIEW_QUESTIONS: u32 = 6;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The three phases of a session.
///
/// ```text
/// Warmup ──ask_more (turn < 3)──▶ Warmup
///        ──start_interview / turn ≥ 3──▶ Interview
/// Interview ──follow_up──▶ Interview (same base question)
///           ──next──▶ Interview (next base question) or Feedback (bank / ceiling exhausted)
///           ──end (≥ 3 base questions)──▶ Feedback
/// any ──reset──▶ Warmup
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Warmup,
    Interview,
    Feedback,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Warmup => "warmup",
            Phase::Interview => "interview",
            Phase::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// InterviewLimits
// ---------------------------------------------------------------------------

/// Guardrails applied locally on top of model decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewLimits {
    pub max_warmup_turns: u32,
    pub min_interview_questions: u32,
    pub max_interview_questions: u32,
    /// Follow-ups allowed per base question; `None` means unlimited.
    pub max_followups: Option<u32>,
}

impl Default for InterviewLimits {
    fn default() -> Self {
        Self {
            max_warmup_turns: MAX_WARMUP_TURNS,
            min_interview_questions: MIN_INTERVIEW_QUESTIONS,
            max_interview_questions: MAX_INTERVIEW_QUESTIONS,
            max_followups: None,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryEntry / SessionConfig
// ---------------------------------------------------------------------------

/// One question/answer exchange.  Serialized as `{"q": ..., "a": ...}`, which
/// is also how history is shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Who is being interviewed for what.  Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub role: String,
    pub experience: Experience,
    pub difficulty: Difficulty,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&InterviewConfig::default())
    }
}

impl From<&InterviewConfig> for SessionConfig {
    fn from(config: &InterviewConfig) -> Self {
        Self {
            role: config.role.clone(),
            experience: config.experience,
            difficulty: config.difficulty,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Full mutable state of one interview attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) warmup_turn: u32,
    pub(crate) interview_index: u32,
    pub(crate) followup_count: u32,
    pub(crate) current_question: Option<String>,
    pub(crate) config: SessionConfig,
    /// Cached once generated so feedback is requested only once.
    #[serde(default)]
    pub(crate) feedback: Option<FeedbackPayload>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            phase: Phase::Warmup,
            history: Vec::new(),
            warmup_turn: 0,
            interview_index: 0,
            followup_count: 0,
            current_question: None,
            config,
            feedback: None,
        }
    }

    /// Return to the initial warmup state, keeping the config.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn warmup_turn(&self) -> u32 {
        self.warmup_turn
    }

    pub fn interview_index(&self) -> u32 {
        self.interview_index
    }

    pub fn followup_count(&self) -> u32 {
        self.followup_count
    }

    pub fn current_question(&self) -> Option<&str> {
        self.current_question.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn feedback(&self) -> Option<&FeedbackPayload> {
        self.feedback.as_ref()
    }

    /// `true` until the first question has been asked.
    pub fn is_fresh(&self) -> bool {
        self.phase == Phase::Warmup && self.warmup_turn == 0 && self.current_question.is_none()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dirty_session() -> Session {
        let mut session = Session::default();
        session.phase = Phase::Feedback;
        session.history.push(HistoryEntry::new("q", "a"));
        session.warmup_turn = 3;
        session.interview_index = 4;
        session.followup_count = 2;
        session.current_question = Some("q".into());
        session.feedback = Some(FeedbackPayload::placeholder());
        session
    }

    #[test]
    fn new_session_is_fresh_warmup() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Warmup);
        assert!(session.history().is_empty());
        assert_eq!(session.warmup_turn(), 0);
        assert!(session.is_fresh());
    }

    #[test]
    fn reset_restores_initial_state_and_keeps_config() {
        let mut session = dirty_session();
        session.config.role = "product_manager".into();

        session.reset();

        assert_eq!(session.phase(), Phase::Warmup);
        assert!(session.history().is_empty());
        assert_eq!(session.warmup_turn(), 0);
        assert_eq!(session.interview_index(), 0);
        assert_eq!(session.followup_count(), 0);
        assert!(session.current_question().is_none());
        assert!(session.feedback().is_none());
        assert_eq!(session.config().role, "product_manager");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = dirty_session();
        once.reset();
        let mut twice = once.clone();
        twice.reset();
        assert_eq!(once, twice);
    }

    #[test]
    fn history_serializes_as_q_and_a() {
        let json = serde_json::to_string(&HistoryEntry::new("Why?", "Because.")).unwrap();
        assert_eq!(json, r#"{"q":"Why?","a":"Because."}"#);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Warmup.to_string(), "warmup");
        assert_eq!(Phase::Interview.label(), "interview");
        assert_eq!(Phase::Feedback.label(), "feedback");
    }

    #[test]
    fn default_limits() {
        let limits = InterviewLimits::default();
        assert_eq!(limits.max_warmup_turns, 3);
        assert_eq!(limits.min_interview_questions, 3);
        assert_eq!(limits.max_interview_questions, 6);
        assert_eq!(limits.max_followups, None);
    }
}
