#![deny(
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

use async_trait::async_trait;
use std::sync::Arc;

pub mod credentials;
pub mod error;
pub mod message;

pub use credentials::Credentials;
pub use error::{DialogError, Result};
pub use message::{DialogId, Message, Role, TIMESTAMP_FORMAT};

/// A chat-completion backend.
///
/// `context` is the exact, already framed message list to transmit. The
/// returned assistant message carries `dialog_id` and is not persisted.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        context: &[Message],
        model: &str,
        dialog_id: &DialogId,
    ) -> Result<Message>;
}

/// Durable, append-only log of messages keyed by dialog id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All messages of a dialog in chronological order; empty when unknown.
    async fn messages_by_dialog(&self, dialog_id: &DialogId) -> Result<Vec<Message>>;

    async fn store_message(&self, message: &Message) -> Result<()>;

    /// Deletes every message of the dialog, returning how many were removed.
    async fn remove_dialog(&self, dialog_id: &DialogId) -> Result<u64>;

    async fn list_dialog_ids(&self) -> Result<Vec<DialogId>>;
}

#[async_trait]
impl<T> CompletionProvider for Arc<T>
where
    T: CompletionProvider + ?Sized,
{
    async fn complete(
        &self,
        context: &[Message],
        model: &str,
        dialog_id: &DialogId,
    ) -> Result<Message> {
        (**self).complete(context, model, dialog_id).await
    }
}

#[async_trait]
impl<T> MessageStore for Arc<T>
where
    T: MessageStore + ?Sized,
{
    async fn messages_by_dialog(&self, dialog_id: &DialogId) -> Result<Vec<Message>> {
        (**self).messages_by_dialog(dialog_id).await
    }

    async fn store_message(&self, message: &Message) -> Result<()> {
        (**self).store_message(message).await
    }

    async fn remove_dialog(&self, dialog_id: &DialogId) -> Result<u64> {
        (**self).remove_dialog(dialog_id).await
    }

    async fn list_dialog_ids(&self) -> Result<Vec<DialogId>> {
        (**self).list_dialog_ids().await
    }
}
