//! Guardrails and state transitions.
//!
//! Everything here is synchronous and free of I/O: given a [`Session`] and a
//! typed [`Decision`], decide what actually happens.  The model proposes, the
//! guardrails dispose:
//!
//! * warmup ends once `warmup_turn` reaches the warmup cap, whatever the model said;
//! * `end` before the minimum number of base questions becomes `next`;
//! * a follow-up beyond `max_followups` (when configured) becomes `next`;
//! * `next` past the bank or the question ceiling moves to feedback.

use crate::interview::state::{InterviewLimits, Phase, Session};
use crate::llm::{Decision, InterviewAction, InterviewDecision, WarmupDecision, WarmupNext};

/// Opening question when the model gives nothing usable.
pub const DEFAULT_OPENING_QUESTION: &str = "Hi — could you introduce yourself?";
/// Warmup question when an `ask_more` decision carries no text.
pub const DEFAULT_WARMUP_QUESTION: &str = "Tell me more about your recent project.";
/// Follow-up when a `follow_up` decision carries no text.
pub const DEFAULT_FOLLOW_UP: &str = "Can you expand on that?";

/// The warmup move actually taken at `warmup_turn`.
pub fn effective_warmup(next: WarmupNext, warmup_turn: u32, limits: &InterviewLimits) -> WarmupNext {
    if warmup_turn >= limits.max_warmup_turns {
        WarmupNext::StartInterview
    } else {
        next
    }
}

/// The interview action actually taken for the current base question.
pub fn effective_interview(
    action: InterviewAction,
    interview_index: u32,
    followup_count: u32,
    limits: &InterviewLimits,
) -> InterviewAction {
    match action {
        InterviewAction::End if interview_index + 1 < limits.min_interview_questions => {
            InterviewAction::Next
        }
        InterviewAction::FollowUp
            if limits
                .max_followups
                .is_some_and(|max| followup_count >= max) =>
        {
            InterviewAction::Next
        }
        other => other,
    }
}

/// Install the first warmup question.  The model's `next` is irrelevant here.
pub fn open_warmup(session: &mut Session, decision: Decision) {
    let question = match decision {
        Decision::Warmup(WarmupDecision { question, .. }) => non_empty(question),
        _ => None,
    };
    session.warmup_turn = 1;
    session.current_question =
        Some(question.unwrap_or_else(|| DEFAULT_OPENING_QUESTION.to_string()));
}

/// Apply a decision for the session's current phase.
///
/// `bank_len` is the number of base questions available for the session's
/// role.  A decision for a different phase is ignored.
pub fn apply(session: &mut Session, decision: Decision, limits: &InterviewLimits, bank_len: usize) {
    match (session.phase, decision) {
        (Phase::Warmup, Decision::Warmup(d)) => apply_warmup(session, d, limits),
        (Phase::Interview, Decision::Interview(d)) => apply_interview(session, d, limits, bank_len),
        (Phase::Feedback, Decision::Feedback(payload)) => {
            if session.feedback.is_none() {
                session.feedback = Some(payload);
            }
        }
        (phase, other) => {
            log::warn!(
                "session: ignoring {} decision while in {phase}",
                other.phase()
            );
        }
    }
}

fn apply_warmup(session: &mut Session, decision: WarmupDecision, limits: &InterviewLimits) {
    let next = effective_warmup(decision.next, session.warmup_turn, limits);
    if next != decision.next {
        log::debug!(
            "session: warmup cap reached at turn {}, starting interview",
            session.warmup_turn
        );
    }

    match next {
        WarmupNext::AskMore => {
            session.warmup_turn += 1;
            session.current_question = Some(
                non_empty(decision.question)
                    .unwrap_or_else(|| DEFAULT_WARMUP_QUESTION.to_string()),
            );
        }
        WarmupNext::StartInterview => {
            session.phase = Phase::Interview;
            session.interview_index = 0;
            session.followup_count = 0;
            session.current_question = None;
        }
    }
}

fn apply_interview(
    session: &mut Session,
    decision: InterviewDecision,
    limits: &InterviewLimits,
    bank_len: usize,
) {
    let action = effective_interview(
        decision.action,
        session.interview_index,
        session.followup_count,
        limits,
    );
    if action != decision.action {
        log::debug!(
            "session: {:?} overridden to {:?} at question {}",
            decision.action,
            action,
            session.interview_index + 1
        );
    }

    match action {
        InterviewAction::FollowUp => {
            session.followup_count += 1;
            session.current_question = Some(
                decision
                    .question
                    .and_then(non_empty)
                    .unwrap_or_else(|| DEFAULT_FOLLOW_UP.to_string()),
            );
        }
        InterviewAction::Next => {
            session.interview_index += 1;
            session.followup_count = 0;
            session.current_question = None;
            if base_questions_exhausted(session.interview_index, limits, bank_len) {
                session.phase = Phase::Feedback;
            }
        }
        InterviewAction::End => {
            session.current_question = None;
            session.phase = Phase::Feedback;
        }
    }
}

/// Install the base question at `interview_index` if none is pending.
///
/// Returns `false` (and moves the session to feedback) when the bank or the
/// question ceiling is exhausted.
pub fn load_base_question(session: &mut Session, questions: &[String], limits: &InterviewLimits) -> bool {
    if session.current_question.is_some() {
        return true;
    }
    if base_questions_exhausted(session.interview_index, limits, questions.len()) {
        session.phase = Phase::Feedback;
        return false;
    }
    session.followup_count = 0;
    session.current_question = questions.get(session.interview_index as usize).cloned();
    session.current_question.is_some()
}

fn base_questions_exhausted(index: u32, limits: &InterviewLimits, bank_len: usize) -> bool {
    index as usize >= bank_len || index >= limits.max_interview_questions
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
