//! Interview session module.
//!
//! * [`Session`]: serializable per-attempt state (phase, history, counters).
//! * [`transition`]: pure guardrails applied on top of model decisions.
//! * [`Interviewer`]: async orchestrator, one decision request per answer.
//! * [`QuestionBank`]: role-keyed base questions.
//! * [`SessionStore`]: JSON persistence for `--resume`.

pub mod bank;
pub mod runner;
pub mod state;
pub mod store;
pub mod transition;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use bank::{QuestionBank, RoleQuestions, UNKNOWN_ROLE_QUESTION};
pub use runner::{spoken_feedback, Interviewer, Prompt, Step};
pub use state::{
    HistoryEntry, InterviewLimits, Phase, Session, SessionConfig, MAX_INTERVIEW_QUESTIONS,
    MAX_WARMUP_TURNS, MIN_INTERVIEW_QUESTIONS,
};
pub use store::{SessionStore, StoreError};
