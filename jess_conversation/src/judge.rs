//! Secondary completion deciding whether a dialog has concluded.

use jess_core::{CompletionProvider, DialogError, DialogId, Message, Result};
use tracing::{debug, info};

use crate::ContextBuilder;

/// Asks a lighter model tier for a true/false "is this dialog over" verdict.
///
/// The question and the model's answer are never persisted.
#[derive(Debug, Clone)]
pub struct TerminationJudge {
    builder: ContextBuilder,
    model: String,
    instruction: String,
}

impl TerminationJudge {
    #[must_use]
    pub fn new(
        builder: ContextBuilder,
        model: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            model: model.into(),
            instruction: instruction.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn is_over<P>(
        &self,
        provider: &P,
        messages: &[Message],
        dialog_id: &DialogId,
    ) -> Result<bool>
    where
        P: CompletionProvider + ?Sized,
    {
        let context = self
            .builder
            .build(messages, dialog_id, Some(&self.instruction));
        debug!(
            "Asking {} whether dialog {} is over ({} context messages)",
            self.model,
            dialog_id,
            context.len()
        );

        let reply = provider.complete(&context, &self.model, dialog_id).await?;
        let verdict = parse_verdict(reply.content())?;

        info!("Termination verdict for dialog {}: {}", dialog_id, verdict);
        Ok(verdict)
    }
}

/// Strict boolean literal, case-insensitive, surrounding whitespace ignored.
pub fn parse_verdict(reply: &str) -> Result<bool> {
    let verdict = reply.trim();
    if verdict.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if verdict.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(DialogError::Parse(format!(
            "expected true/false termination verdict, got {verdict:?}"
        )))
    }
}
