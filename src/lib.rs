//! Mock-interview partner.
//!
//! A session walks a candidate through three phases (warmup, interview,
//! feedback).  A hosted chat model decides what to ask next; local guardrails
//! bound what it may decide; speech is transcribed and synthesized through a
//! gateway that degrades instead of failing.

pub mod app;
pub mod config;
pub mod interview;
pub mod llm;
pub mod speech;
