//! Character-budget truncation of the outgoing conversation.

use jess_core::Message;
use tracing::debug;

/// Drop the oldest messages until the combined content length fits
/// `max_chars`.
///
/// The newest message is always kept, even when it alone exceeds the budget.
#[must_use]
pub fn trim_messages(messages: &[Message], max_chars: usize) -> Vec<Message> {
    let mut total: usize = messages.iter().map(Message::char_len).sum();
    let mut start = 0;

    while total > max_chars && messages.len() - start > 1 {
        total -= messages[start].char_len();
        start += 1;
    }

    if start > 0 {
        debug!(
            "Trimmed {} of {} messages to fit {} chars ({} remaining)",
            start,
            messages.len(),
            max_chars,
            total
        );
    }

    messages[start..].to_vec()
}
