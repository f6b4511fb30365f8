//! Rendering stored dialogs for display.

use jess_core::{DialogId, Message, MessageStore, Result};

/// One `[<timestamp>] <role>: <content>` line per message.
#[must_use]
pub fn render_history(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|m| format!("[{}] {}: {}", m.formatted_timestamp(), m.role(), m.content()))
        .collect()
}

pub async fn show_history<S>(store: &S, dialog_id: &DialogId) -> Result<Vec<String>>
where
    S: MessageStore + ?Sized,
{
    let messages = store.messages_by_dialog(dialog_id).await?;
    Ok(render_history(&messages))
}
