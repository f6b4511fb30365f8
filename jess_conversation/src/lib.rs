#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Dialog orchestration.
//!
//! Each user turn flows through the same pipeline:
//! - the [`TerminationJudge`] asks a cheap model whether the dialog is over
//! - [`trim_messages`] bounds the conversation to a character budget
//! - the [`ContextBuilder`] frames it with a system message
//! - the completion provider produces the reply
//! - the [`DialogOrchestrator`] persists the user message and then the reply

mod context;
mod history;
mod judge;
mod manager;
mod prompt;
mod trim;

pub use context::ContextBuilder;
pub use history::{render_history, show_history};
pub use judge::{TerminationJudge, parse_verdict};
pub use manager::{
    ConversationConfig, DEFAULT_CHAT_MODEL, DEFAULT_CONTEXT_CHAR_BUDGET, DEFAULT_JUDGE_MODEL,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TERMINATION_INSTRUCTION, DialogOrchestrator, SessionEnd,
    TurnOutcome,
};
pub use prompt::{FileInput, REFACTOR_PROMPT};
pub use trim::trim_messages;
