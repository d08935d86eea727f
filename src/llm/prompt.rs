//! Prompt builder for the interviewer model.
//!
//! [`PromptBuilder`] renders one user prompt per decision point:
//!
//! | Method | Phase | Expected JSON |
//! |--------|-------|---------------|
//! | [`warmup_start`](PromptBuilder::warmup_start) | Warmup | first warmup question |
//! | [`warmup_continue`](PromptBuilder::warmup_continue) | Warmup | `ask_more` / `start_interview` |
//! | [`interview_decision`](PromptBuilder::interview_decision) | Interview | `follow_up` / `next` / `end` |
//! | [`feedback`](PromptBuilder::feedback) | Feedback | scores + strengths + improvements |
//! | [`repair`](PromptBuilder::repair) | any | the same shape, fixed |
//!
//! The system message ([`SYSTEM_INSTRUCTION`]) is shared by every call and
//! describes all three JSON shapes, so a repair request can be answered
//! without the original user prompt.

use crate::interview::{HistoryEntry, InterviewLimits, Phase, SessionConfig};

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

pub const SYSTEM_INSTRUCTION: &str = "\
You are a professional interview coach running a realistic mock interview.

Goals:
- Hold a warm, natural conversation and adapt to the candidate's answers.
- Decide like a real interviewer when to probe, when to move on and when to stop.
- Give expert, actionable feedback at the end.

Output rules:
- Reply with STRICT JSON only. No markdown, no commentary, no extra text.
- Never output pipes (|). Choose exactly one value for every field.

WARMUP mode (rapport, background, motivation; at most 3 questions):
{\"stage\": \"warmup\", \"question\": \"<next warmup question or transition line>\", \"next\": \"ask_more\" | \"start_interview\"}

INTERVIEW mode (role-aware, adaptive):
- incomplete or vague answer -> follow_up with a precise question about that answer
- solid answer -> next
- last two answers strong, or the candidate keeps struggling -> end
{\"stage\": \"interview\", \"action\": \"follow_up\" | \"next\" | \"end\", \"question\": \"<follow-up question>\" | null}

FEEDBACK mode (personalised, honest, encouraging):
{\"stage\": \"feedback\", \"feedback\": {
  \"scores\": {\"structure\": 1-5, \"clarity\": 1-5, \"examples\": 1-5, \"communication\": 1-5,
             \"confidence\": 1-5, \"technical_depth\": 1-5, \"follow_up_handling\": 1-5},
  \"strengths\": [\"...\"],
  \"improvements\": [\"...\"],
  \"sample_answer\": \"one weaker answer rewritten with STAR/CAR or structured technical reasoning\",
  \"summary\": \"readiness, communication quality and next steps\"
}}";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Renders per-phase prompts from session data.
///
/// ```rust
/// use interview_partner::interview::{InterviewLimits, SessionConfig};
/// use interview_partner::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new(InterviewLimits::default());
/// let prompt = builder.warmup_start(&SessionConfig::default());
/// assert!(prompt.contains("software_engineer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    limits: InterviewLimits,
}

impl PromptBuilder {
    pub fn new(limits: InterviewLimits) -> Self {
        Self { limits }
    }

    pub fn system(&self) -> &'static str {
        SYSTEM_INSTRUCTION
    }

    /// Ask for the first warmup question.
    pub fn warmup_start(&self, config: &SessionConfig) -> String {
        format!(
            "Start WARMUP mode.\n\n\
             Candidate role: {role}\n\
             Candidate experience: {experience}\n\n\
             Ask the FIRST warmup question: a friendly, open introduction.\n\n\
             Return STRICT JSON only:\n\
             {{\"stage\": \"warmup\", \"question\": \"<question>\", \"next\": \"ask_more\"}}\n",
            role = config.role,
            experience = config.experience,
        )
    }

    /// Ask whether to continue warming up after the candidate's answer.
    pub fn warmup_continue(
        &self,
        warmup_turn: u32,
        history: &[HistoryEntry],
        answer: &str,
    ) -> String {
        format!(
            "Continue WARMUP mode.\n\n\
             Warmup turn: {warmup_turn} of {max}\n\
             Conversation so far:\n{history}\n\n\
             Last answer:\n\"{answer}\"\n\n\
             Rules:\n\
             - At most {max} warmup questions; after that choose start_interview.\n\
             - Start the interview early if the answer is strong or the candidate seems ready.\n\
             - Do not repeat earlier questions. Keep the tone friendly.\n\n\
             To continue:\n\
             {{\"stage\": \"warmup\", \"question\": \"<next warmup question>\", \"next\": \"ask_more\"}}\n\
             To begin the interview:\n\
             {{\"stage\": \"warmup\", \"question\": \"Great, let's begin the interview.\", \"next\": \"start_interview\"}}\n",
            max = self.limits.max_warmup_turns,
            history = history_json(history),
        )
    }

    /// Ask for a follow-up / next / end decision on the current answer.
    pub fn interview_decision(
        &self,
        config: &SessionConfig,
        current_question: &str,
        answer: &str,
        history: &[HistoryEntry],
    ) -> String {
        format!(
            "You are in INTERVIEW mode.\n\n\
             Role: {role}\n\
             Difficulty: {difficulty}\n\n\
             Current question:\n\"{current_question}\"\n\n\
             Candidate's answer:\n\"{answer}\"\n\n\
             Interview history (all questions and answers so far):\n{history}\n\n\
             Decision rules:\n\
             1. Incomplete, unclear, too high-level or missing examples -> \"follow_up\".\n\
             2. Solid, structured, clearly understood -> \"next\".\n\
             3. Last TWO answers were strong -> \"end\".\n\
             4. Candidate struggling repeatedly -> \"end\".\n\
             5. HARD LIMIT: at most {max} interview questions; when reached -> \"end\".\n\
             6. Follow-ups belong to the same question and do not count as new questions.\n\
             7. Follow-ups must be precise, specific to the previous answer and never generic or repeated.\n\n\
             Return STRICT JSON only:\n\
             {{\"stage\": \"interview\", \"action\": \"follow_up\", \"question\": \"<follow-up question>\"}}\n\
             {{\"stage\": \"interview\", \"action\": \"next\", \"question\": null}}\n\
             {{\"stage\": \"interview\", \"action\": \"end\", \"question\": null}}\n",
            role = config.role,
            difficulty = config.difficulty,
            max = self.limits.max_interview_questions,
            history = history_json(history),
        )
    }

    /// Ask for the final structured feedback.
    pub fn feedback(&self, config: &SessionConfig, history: &[HistoryEntry]) -> String {
        format!(
            "You are in FEEDBACK mode.\n\n\
             Role: {role}\n\n\
             Interview history:\n{history}\n\n\
             Write expert-level feedback grounded in the candidate's real answers:\n\
             - strengths and blind spots across communication, technical depth, structure,\n  \
               example quality (STAR/CAR), confidence, follow-up handling and teamwork;\n\
             - concrete steps to practise before a real interview;\n\
             - no placeholders such as \"Strength 1\";\n\
             - rewrite one weaker answer as a stronger sample answer;\n\
             - be encouraging but honest. Every score is an integer from 1 to 5.\n\n\
             Return STRICT JSON only:\n\
             {{\"stage\": \"feedback\", \"feedback\": {{\"scores\": {{\"structure\": 0, \"clarity\": 0, \
             \"examples\": 0, \"communication\": 0, \"confidence\": 0, \"technical_depth\": 0, \
             \"follow_up_handling\": 0}}, \"strengths\": [], \"improvements\": [], \
             \"sample_answer\": \"\", \"summary\": \"\"}}}}\n",
            role = config.role,
            history = history_json(history),
        )
    }

    /// Ask the model to fix its own malformed output.
    pub fn repair(&self, phase: Phase, raw: &str) -> String {
        format!(
            "Return valid {} JSON only: {raw}",
            phase.label().to_uppercase()
        )
    }
}

fn history_json(history: &[HistoryEntry]) -> String {
    serde_json::to_string_pretty(history).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
