use async_trait::async_trait;
use jess_core::{DialogError, DialogId, Message, MessageStore, Result};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// Message log kept in process memory, in append order.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: Mutex<Vec<Message>>,
}

impl MemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across all dialogs.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Message>>> {
        self.messages
            .lock()
            .map_err(|_| DialogError::storage("message store lock poisoned"))
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn messages_by_dialog(&self, dialog_id: &DialogId) -> Result<Vec<Message>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|m| m.dialog_id() == dialog_id)
            .cloned()
            .collect())
    }

    async fn store_message(&self, message: &Message) -> Result<()> {
        let mut messages = self.lock()?;
        if messages.iter().any(|m| m.id() == message.id()) {
            return Err(DialogError::Storage(format!(
                "message {} is already stored",
                message.id()
            )));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn remove_dialog(&self, dialog_id: &DialogId) -> Result<u64> {
        let mut messages = self.lock()?;
        let before = messages.len();
        messages.retain(|m| m.dialog_id() != dialog_id);
        Ok(u64::try_from(before - messages.len()).unwrap_or(u64::MAX))
    }

    async fn list_dialog_ids(&self) -> Result<Vec<DialogId>> {
        let ids: BTreeSet<DialogId> = self
            .lock()?
            .iter()
            .map(|m| m.dialog_id().clone())
            .collect();
        Ok(ids.into_iter().collect())
    }
}
