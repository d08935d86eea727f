//! Typed decisions returned by the interviewer model.
//!
//! Every decision point has an explicit serde schema.  [`Decision::parse_strict`]
//! is the only place model output turns into typed data; anything that does not
//! match the shape of the current [`Phase`] is a [`DecisionError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interview::Phase;

/// Lowest and highest score a feedback metric may carry.
pub const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Score given to every metric by the fallback feedback.
pub const DEFAULT_SCORE: u8 = 3;

// ---------------------------------------------------------------------------
// DecisionError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("response is not valid {phase} JSON: {source}")]
    Json {
        phase: Phase,
        #[source]
        source: serde_json::Error,
    },

    #[error("score `{metric}` = {value} is outside 1..=5")]
    ScoreOutOfRange { metric: &'static str, value: u8 },
}

// ---------------------------------------------------------------------------
// Warmup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupNext {
    AskMore,
    StartInterview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupDecision {
    /// Next warmup question, or a transition line when starting the interview.
    #[serde(default, deserialize_with = "nullable_string")]
    pub question: String,
    pub next: WarmupNext,
}

// ---------------------------------------------------------------------------
// Interview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewAction {
    FollowUp,
    Next,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewDecision {
    pub action: InterviewAction,
    /// Follow-up question text; `None` for `next` / `end`.
    #[serde(default)]
    pub question: Option<String>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// The seven scored metrics, each an integer in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub structure: u8,
    pub clarity: u8,
    pub examples: u8,
    pub communication: u8,
    pub confidence: u8,
    pub technical_depth: u8,
    pub follow_up_handling: u8,
}

impl Scores {
    pub fn uniform(value: u8) -> Self {
        Self {
            structure: value,
            clarity: value,
            examples: value,
            communication: value,
            confidence: value,
            technical_depth: value,
            follow_up_handling: value,
        }
    }

    /// `(metric name, score)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, u8); 7] {
        [
            ("structure", self.structure),
            ("clarity", self.clarity),
            ("examples", self.examples),
            ("communication", self.communication),
            ("confidence", self.confidence),
            ("technical_depth", self.technical_depth),
            ("follow_up_handling", self.follow_up_handling),
        ]
    }

    fn validate(&self) -> Result<(), DecisionError> {
        match self
            .entries()
            .into_iter()
            .find(|(_, value)| !SCORE_RANGE.contains(value))
        {
            Some((metric, value)) => Err(DecisionError::ScoreOutOfRange { metric, value }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub scores: Scores,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub sample_answer: String,
    #[serde(default)]
    pub summary: String,
}

impl FeedbackPayload {
    /// Generic feedback used when the model never produced a usable payload.
    pub fn placeholder() -> Self {
        Self {
            scores: Scores::uniform(DEFAULT_SCORE),
            strengths: vec!["Clear introduction.".into()],
            improvements: vec!["Provide more concrete examples.".into()],
            sample_answer: "Improved example answer placeholder.".into(),
            summary: "Overall solid performance.".into(),
        }
    }
}

/// The model is asked for `{"stage": "feedback", "feedback": {...}}`; a bare
/// payload is accepted as well since repaired output often drops the envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedbackWire {
    Wrapped { feedback: FeedbackPayload },
    Bare(FeedbackPayload),
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Warmup(WarmupDecision),
    Interview(InterviewDecision),
    Feedback(FeedbackPayload),
}

impl Decision {
    /// Parse `raw` against the shape expected in `phase`.
    ///
    /// Surrounding whitespace and a markdown code fence are tolerated;
    /// everything inside must be exactly one JSON object of the right shape.
    pub fn parse_strict(raw: &str, phase: Phase) -> Result<Self, DecisionError> {
        let body = strip_code_fence(raw);
        let json_err = |source| DecisionError::Json { phase, source };

        match phase {
            Phase::Warmup => serde_json::from_str::<WarmupDecision>(body)
                .map(Decision::Warmup)
                .map_err(json_err),
            Phase::Interview => serde_json::from_str::<InterviewDecision>(body)
                .map(Decision::Interview)
                .map_err(json_err),
            Phase::Feedback => {
                let payload = match serde_json::from_str::<FeedbackWire>(body).map_err(json_err)? {
                    FeedbackWire::Wrapped { feedback } => feedback,
                    FeedbackWire::Bare(payload) => payload,
                };
                payload.scores.validate()?;
                Ok(Decision::Feedback(payload))
            }
        }
    }

    /// The decision substituted after a failed repair round-trip.
    pub fn fallback(phase: Phase) -> Self {
        match phase {
            Phase::Warmup => Decision::Warmup(WarmupDecision {
                question: String::new(),
                next: WarmupNext::StartInterview,
            }),
            Phase::Interview => Decision::Interview(InterviewDecision {
                action: InterviewAction::End,
                question: None,
            }),
            Phase::Feedback => Decision::Feedback(FeedbackPayload::placeholder()),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Decision::Warmup(_) => Phase::Warmup,
            Decision::Interview(_) => Phase::Interview,
            Decision::Feedback(_) => Phase::Feedback,
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    match inner.split_once('\n') {
        Some((_, rest)) => rest.trim(),
        None => inner.trim(),
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_ask_more_parses_exactly() {
        let raw = r#"{"stage": "warmup", "question": "What got you into engineering?", "next": "ask_more"}"#;
        let decision = Decision::parse_strict(raw, Phase::Warmup).unwrap();
        assert_eq!(
            decision,
            Decision::Warmup(WarmupDecision {
                question: "What got you into engineering?".into(),
                next: WarmupNext::AskMore,
            })
        );
    }

    #[test]
    fn warmup_without_next_is_rejected() {
        let raw = r#"{"stage": "warmup", "question": "Hi"}"#;
        assert!(Decision::parse_strict(raw, Phase::Warmup).is_err());
    }

    #[test]
    fn warmup_with_unknown_next_is_rejected() {
        let raw = r#"{"question": "Hi", "next": "ask_more | start_interview"}"#;
        assert!(Decision::parse_strict(raw, Phase::Warmup).is_err());
    }

    #[test]
    fn interview_null_question_is_none() {
        let raw = r#"{"stage": "interview", "action": "next", "question": null}"#;
        let decision = Decision::parse_strict(raw, Phase::Interview).unwrap();
        assert_eq!(
            decision,
            Decision::Interview(InterviewDecision {
                action: InterviewAction::Next,
                question: None,
            })
        );
    }

    #[test]
    fn interview_follow_up_keeps_question() {
        let raw = r#"{"action": "follow_up", "question": "Which metric did you optimise?"}"#;
        match Decision::parse_strict(raw, Phase::Interview).unwrap() {
            Decision::Interview(d) => {
                assert_eq!(d.action, InterviewAction::FollowUp);
                assert_eq!(d.question.as_deref(), Some("Which metric did you optimise?"));
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"action\": \"end\", \"question\": null}\n```";
        let decision = Decision::parse_strict(raw, Phase::Interview).unwrap();
        assert_eq!(decision.phase(), Phase::Interview);
    }

    #[test]
    fn prose_around_json_is_rejected() {
        let raw = "Sure! {\"action\": \"end\", \"question\": null}";
        assert!(Decision::parse_strict(raw, Phase::Interview).is_err());
    }

    #[test]
    fn feedback_envelope_parses() {
        let raw = r#"{
            "stage": "feedback",
            "feedback": {
                "scores": {"structure": 4, "clarity": 5, "examples": 3, "communication": 4,
                           "confidence": 2, "technical_depth": 4, "follow_up_handling": 1},
                "strengths": ["Concise"],
                "improvements": ["Quantify impact", "Slow down"],
                "sample_answer": "In my last role...",
                "summary": "Nearly ready."
            }
        }"#;
        match Decision::parse_strict(raw, Phase::Feedback).unwrap() {
            Decision::Feedback(payload) => {
                assert_eq!(payload.scores.clarity, 5);
                assert_eq!(payload.scores.follow_up_handling, 1);
                assert_eq!(payload.strengths, vec!["Concise".to_string()]);
                assert_eq!(payload.improvements.len(), 2);
                assert_eq!(payload.sample_answer, "In my last role...");
                assert_eq!(payload.summary, "Nearly ready.");
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn bare_feedback_payload_parses() {
        let raw = r#"{"scores": {"structure": 3, "clarity": 3, "examples": 3, "communication": 3,
                      "confidence": 3, "technical_depth": 3, "follow_up_handling": 3}}"#;
        assert!(Decision::parse_strict(raw, Phase::Feedback).is_ok());
    }

    #[test]
    fn feedback_template_zeros_are_rejected() {
        let raw = r#"{"feedback": {"scores": {"structure": 0, "clarity": 0, "examples": 0,
                      "communication": 0, "confidence": 0, "technical_depth": 0,
                      "follow_up_handling": 0}}}"#;
        let err = Decision::parse_strict(raw, Phase::Feedback).unwrap_err();
        assert!(matches!(
            err,
            DecisionError::ScoreOutOfRange { metric: "structure", value: 0 }
        ));
    }

    #[test]
    fn feedback_missing_metric_is_rejected() {
        let raw = r#"{"feedback": {"scores": {"structure": 3, "clarity": 3}}}"#;
        assert!(Decision::parse_strict(raw, Phase::Feedback).is_err());
    }

    #[test]
    fn fallbacks_match_phase() {
        assert_eq!(
            Decision::fallback(Phase::Warmup),
            Decision::Warmup(WarmupDecision {
                question: String::new(),
                next: WarmupNext::StartInterview,
            })
        );
        assert_eq!(
            Decision::fallback(Phase::Interview),
            Decision::Interview(InterviewDecision {
                action: InterviewAction::End,
                question: None,
            })
        );
        match Decision::fallback(Phase::Feedback) {
            Decision::Feedback(payload) => {
                assert!(payload.scores.entries().iter().all(|(_, v)| *v == 3));
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{}"), "```{}");
    }
}
