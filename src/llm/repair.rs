//! Response parser with a single repair round-trip.
//!
//! [`ResponseParser`] turns raw model output into a typed [`Decision`] and
//! never fails:
//!
//! 1. strict parse of the raw text;
//! 2. on failure, one repair request (`"Return valid <PHASE> JSON only: <raw>"`)
//!    and a strict parse of the repaired text;
//! 3. on a second failure, [`Decision::fallback`] for the phase.
//!
//! Transport errors are folded into the same path: a failed first call is
//! treated as malformed output (its error text is what gets repaired), a
//! failed repair call falls through to the default.

use std::sync::Arc;

use crate::interview::Phase;
use crate::llm::client::ChatClient;
use crate::llm::decision::Decision;
use crate::llm::prompt::PromptBuilder;

/// Wraps a [`ChatClient`] so that every decision request yields a valid
/// [`Decision`].
pub struct ResponseParser {
    client: Arc<dyn ChatClient>,
    prompts: PromptBuilder,
    temperature: f32,
}

impl ResponseParser {
    pub fn new(client: Arc<dyn ChatClient>, prompts: PromptBuilder, temperature: f32) -> Self {
        Self {
            client,
            prompts,
            temperature,
        }
    }

    /// Send `prompt` and parse the answer as a `phase` decision.
    pub async fn request(&self, prompt: &str, phase: Phase) -> Decision {
        let raw = match self
            .client
            .complete(self.prompts.system(), prompt, self.temperature)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("llm: {phase} request failed: {e}");
                format!("LLM error: {e}")
            }
        };
        self.parse(&raw, phase).await
    }

    /// Parse `raw` as a `phase` decision, repairing once if needed.
    ///
    /// This **never** fails; the worst case is the phase default.
    pub async fn parse(&self, raw: &str, phase: Phase) -> Decision {
        let first_err = match Decision::parse_strict(raw, phase) {
            Ok(decision) => return decision,
            Err(e) => e,
        };
        log::debug!("llm: malformed {phase} response ({first_err}), requesting repair");

        let repair_prompt = self.prompts.repair(phase, raw);
        let repaired = match self
            .client
            .complete(self.prompts.system(), &repair_prompt, self.temperature)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                log::warn!("llm: {phase} repair request failed ({e}); using default decision");
                return Decision::fallback(phase);
            }
        };

        match Decision::parse_strict(&repaired, phase) {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("llm: {phase} repair still malformed ({e}); using default decision");
                Decision::fallback(phase)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::client::LlmError;
    use crate::llm::decision::{InterviewAction, InterviewDecision, WarmupNext};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replays queued results and records every user prompt it received.
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for Scripted {
        async fn complete(&self, _system: &str, user: &str, _t: f32) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(user.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }

    fn parser(client: Arc<Scripted>) -> ResponseParser {
        ResponseParser::new(client, PromptBuilder::default(), 0.2)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn valid_response_needs_no_repair() {
        let client = Scripted::new(vec![]);
        let raw = r#"{"action": "follow_up", "question": "Why Postgres?"}"#;

        let decision = parser(Arc::clone(&client)).parse(raw, Phase::Interview).await;

        assert_eq!(
            decision,
            Decision::Interview(InterviewDecision {
                action: InterviewAction::FollowUp,
                question: Some("Why Postgres?".into()),
            })
        );
        assert!(client.prompts().is_empty());
    }

    #[tokio::test]
    async fn one_repair_fixes_malformed_output() {
        let client = Scripted::new(vec![Ok(
            r#"{"question": "Ready?", "next": "start_interview"}"#.into()
        )]);

        let decision = parser(Arc::clone(&client))
            .parse("question: Ready?", Phase::Warmup)
            .await;

        match decision {
            Decision::Warmup(d) => assert_eq!(d.next, WarmupNext::StartInterview),
            other => panic!("unexpected decision {other:?}"),
        }
        assert_eq!(
            client.prompts(),
            vec!["Return valid WARMUP JSON only: question: Ready?".to_string()]
        );
    }

    #[tokio::test]
    async fn double_failure_returns_feedback_default() {
        let client = Scripted::new(vec![Ok("not json".into())]);

        let decision = parser(Arc::clone(&client))
            .parse("not json", Phase::Feedback)
            .await;

        assert_eq!(decision, Decision::fallback(Phase::Feedback));
        // Exactly one repair attempt.
        assert_eq!(client.prompts().len(), 1);
    }

    #[tokio::test]
    async fn failed_repair_call_returns_default() {
        let client = Scripted::new(vec![Err(LlmError::Timeout)]);

        let decision = parser(client).parse("{", Phase::Interview).await;

        assert_eq!(decision, Decision::fallback(Phase::Interview));
    }

    #[tokio::test]
    async fn transport_error_is_repaired_then_defaulted() {
        let client = Scripted::new(vec![
            Err(LlmError::Request("connection refused".into())),
            Ok("still broken".into()),
        ]);

        let decision = parser(Arc::clone(&client))
            .request("prompt", Phase::Warmup)
            .await;

        assert_eq!(decision, Decision::fallback(Phase::Warmup));
        let prompts = client.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with("Return valid WARMUP JSON only: LLM error:"));
    }

    #[tokio::test]
    async fn request_sends_prompt_and_parses_reply() {
        let client = Scripted::new(vec![Ok(r#"{"action": "next", "question": null}"#.into())]);

        let decision = parser(Arc::clone(&client))
            .request("decide", Phase::Interview)
            .await;

        assert_eq!(
            decision,
            Decision::Interview(InterviewDecision {
                action: InterviewAction::Next,
                question: None,
            })
        );
        assert_eq!(client.prompts(), vec!["decide".to_string()]);
    }
}
