//! Outgoing context assembly.

use jess_core::{DialogId, Message};

/// Frames a conversation with the assistant's identity before transmission.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    framing: String,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(framing: impl Into<String>) -> Self {
        Self {
            framing: framing.into(),
        }
    }

    #[must_use]
    pub fn framing(&self) -> &str {
        &self.framing
    }

    /// Returns `[framing, messages.., extra_instruction?]`.
    ///
    /// Both synthetic messages are `system` role and belong to `dialog_id`;
    /// the input is left untouched.
    #[must_use]
    pub fn build(
        &self,
        messages: &[Message],
        dialog_id: &DialogId,
        extra_instruction: Option<&str>,
    ) -> Vec<Message> {
        let mut context = Vec::with_capacity(messages.len() + 2);
        context.push(Message::system(self.framing.clone(), dialog_id.clone()));
        context.extend_from_slice(messages);
        if let Some(instruction) = extra_instruction {
            context.push(Message::system(instruction, dialog_id.clone()));
        }
        context
    }
}
