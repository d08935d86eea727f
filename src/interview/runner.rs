//! Session orchestrator: one decision round-trip per candidate answer.
//!
//! [`Interviewer`] owns the collaborators (decision model, prompt templates,
//! question bank, limits) but not the [`Session`]: the caller keeps the
//! session and hands it in for every turn.
//!
//! # Turn flow
//!
//! ```text
//! advance(session, transcript)
//!   ├─ record {current_question, transcript} in history
//!   ├─ render phase prompt → ResponseParser::request   (parse / repair / default)
//!   ├─ transition::apply                               (guardrails)
//!   └─ current(session)
//!         ├─ Warmup    → pending warmup question
//!         ├─ Interview → pending question, or next base question from the bank
//!         └─ Feedback  → cached payload, or one feedback request
//! ```
//!
//! No I/O happens here except through the [`ChatClient`] trait object.

use std::sync::Arc;

use crate::interview::bank::QuestionBank;
use crate::interview::state::{HistoryEntry, InterviewLimits, Phase, Session};
use crate::interview::transition;
use crate::llm::{ChatClient, FeedbackPayload, PromptBuilder, ResponseParser};

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// A question for the candidate, tagged with the phase it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub phase: Phase,
    pub text: String,
}

/// What the presentation layer should show next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Show (and optionally speak) the question, then record an answer.
    Question(Prompt),
    /// The interview is over; render the feedback.
    Feedback(FeedbackPayload),
}

impl Step {
    fn question(phase: Phase, text: &str) -> Self {
        Step::Question(Prompt {
            phase,
            text: text.to_string(),
        })
    }

    /// Text to speak for this step.
    pub fn spoken_text(&self) -> String {
        match self {
            Step::Question(prompt) => prompt.text.clone(),
            Step::Feedback(payload) => spoken_feedback(payload),
        }
    }
}

/// Short spoken rendition of the feedback.
pub fn spoken_feedback(payload: &FeedbackPayload) -> String {
    format!(
        "Final feedback. Structure {} out of 5. Clarity {} out of 5. \
         Strengths: {}. Improvements: {}. Summary: {}",
        payload.scores.structure,
        payload.scores.clarity,
        payload.strengths.join(", "),
        payload.improvements.join(", "),
        payload.summary,
    )
}

// ---------------------------------------------------------------------------
// Interviewer
// ---------------------------------------------------------------------------

/// Drives a [`Session`] through warmup, interview and feedback.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use interview_partner::config::AppConfig;
/// use interview_partner::interview::{Interviewer, QuestionBank, Session, Step};
/// use interview_partner::llm::ApiChatClient;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let interviewer = Interviewer::new(
///     Arc::new(ApiChatClient::from_config(&config.llm)),
///     QuestionBank::builtin(),
///     config.interview.limits,
///     config.llm.temperature,
/// );
///
/// let mut session = Session::default();
/// let mut step = interviewer.start(&mut session).await;
/// while let Step::Question(prompt) = &step {
///     println!("Interviewer: {}", prompt.text);
///     step = interviewer.advance(&mut session, "My answer.").await;
/// }
/// # }
/// ```
pub struct Interviewer {
    parser: ResponseParser,
    prompts: PromptBuilder,
    bank: QuestionBank,
    limits: InterviewLimits,
}

impl Interviewer {
    pub fn new(
        client: Arc<dyn ChatClient>,
        bank: QuestionBank,
        limits: InterviewLimits,
        temperature: f32,
    ) -> Self {
        let prompts = PromptBuilder::new(limits);
        Self {
            parser: ResponseParser::new(client, prompts.clone(), temperature),
            prompts,
            bank,
            limits,
        }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn limits(&self) -> &InterviewLimits {
        &self.limits
    }

    /// Reset `session` and ask the opening warmup question.
    pub async fn start(&self, session: &mut Session) -> Step {
        session.reset();
        self.current(session).await
    }

    /// The step for the session as it stands, without recording an answer.
    ///
    /// Resolves whatever is pending: the opening question of a fresh session,
    /// the next base question, or the (cached) feedback.
    pub async fn current(&self, session: &mut Session) -> Step {
        if session.phase == Phase::Warmup {
            if session.current_question.is_none() {
                self.open_warmup(session).await;
            }
            if let Some(question) = session.current_question.as_deref() {
                return Step::question(Phase::Warmup, question);
            }
        }

        if session.phase == Phase::Interview {
            let questions = self.bank.questions_for(&session.config.role);
            if transition::load_base_question(session, questions, &self.limits) {
                if let Some(question) = session.current_question.as_deref() {
                    return Step::question(Phase::Interview, question);
                }
            }
        }

        Step::Feedback(self.feedback(session).await)
    }

    /// Record the candidate's answer to the pending question and move on.
    ///
    /// With no pending question (fresh session, or feedback already reached)
    /// nothing is recorded and this behaves like [`current`](Self::current).
    pub async fn advance(&self, session: &mut Session, transcript: &str) -> Step {
        let pending = match (session.phase, session.current_question.clone()) {
            (Phase::Warmup | Phase::Interview, Some(question)) => question,
            _ => return self.current(session).await,
        };

        session
            .history
            .push(HistoryEntry::new(pending.as_str(), transcript));

        let phase = session.phase;
        let prompt = match phase {
            Phase::Warmup => {
                self.prompts
                    .warmup_continue(session.warmup_turn, &session.history, transcript)
            }
            _ => self.prompts.interview_decision(
                &session.config,
                &pending,
                transcript,
                &session.history,
            ),
        };

        let decision = self.parser.request(&prompt, phase).await;
        let bank_len = self.bank.questions_for(&session.config.role).len();
        transition::apply(session, decision, &self.limits, bank_len);

        log::info!(
            "session: {phase} answer recorded (history={}) → {} q{} f{}",
            session.history.len(),
            session.phase,
            session.interview_index + 1,
            session.followup_count
        );

        self.current(session).await
    }

    async fn open_warmup(&self, session: &mut Session) {
        let prompt = self.prompts.warmup_start(&session.config);
        let decision = self.parser.request(&prompt, Phase::Warmup).await;
        transition::open_warmup(session, decision);
    }

    async fn feedback(&self, session: &mut Session) -> FeedbackPayload {
        if let Some(payload) = session.feedback.as_ref() {
            return payload.clone();
        }

        session.phase = Phase::Feedback;
        session.current_question = None;

        let prompt = self.prompts.feedback(&session.config, &session.history);
        let decision = self.parser.request(&prompt, Phase::Feedback).await;
        transition::apply(session, decision, &self.limits, 0);

        session
            .feedback
            .clone()
            .unwrap_or_else(FeedbackPayload::placeholder)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
