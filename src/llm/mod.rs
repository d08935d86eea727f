//! Decision-model module.
//!
//! This module provides:
//! * [`ChatClient`]: async trait for single-shot chat completions.
//! * [`ApiChatClient`]: OpenAI-compatible REST implementation.
//! * [`PromptBuilder`]: renders the per-phase interviewer prompts.
//! * [`Decision`] and friends: typed schemas for model output.
//! * [`ResponseParser`]: strict parse, one repair round-trip, then default.
//! * [`LlmError`] / [`DecisionError`]: error variants.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use interview_partner::config::AppConfig;
//! use interview_partner::interview::Phase;
//! use interview_partner::llm::{ApiChatClient, Decision, PromptBuilder, ResponseParser};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let parser = ResponseParser::new(
//!         Arc::new(ApiChatClient::from_config(&config.llm)),
//!         PromptBuilder::default(),
//!         config.llm.temperature,
//!     );
//!
//!     // Always a valid decision, even when the endpoint is down.
//!     let decision: Decision = parser.request("Decide.", Phase::Interview).await;
//!     println!("{decision:?}");
//! }
//! ```

pub mod client;
pub mod decision;
pub mod prompt;
pub mod repair;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiChatClient, ChatClient, LlmError};
pub use decision::{
    Decision, DecisionError, FeedbackPayload, InterviewAction, InterviewDecision, Scores,
    WarmupDecision, WarmupNext,
};
pub use prompt::PromptBuilder;
pub use repair::ResponseParser;
