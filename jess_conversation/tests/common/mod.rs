//! Test doubles shared by the orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jess_core::{CompletionProvider, DialogError, DialogId, Message, MessageStore, Result};
use jess_conversation::ConversationConfig;
use jess_store::MemoryMessageStore;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A recorded completion request.
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub context: Vec<Message>,
}

/// Provider answering from two scripts, chosen by model tier.
///
/// Requests for the judge model pop a verdict (default `"false"`); all other
/// requests pop a reply (default `"ok"`).
pub struct ScriptedProvider {
    judge_model: String,
    verdicts: Mutex<VecDeque<Result<String>>>,
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::for_judge_model(ConversationConfig::default().judge_model)
    }

    pub fn for_judge_model(judge_model: impl Into<String>) -> Self {
        Self {
            judge_model: judge_model.into(),
            verdicts: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn verdict(self, verdict: Result<&str>) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .push_back(verdict.map(str::to_string));
        self
    }

    pub fn reply(self, reply: Result<&str>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, model: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.model == model)
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        context: &[Message],
        model: &str,
        dialog_id: &DialogId,
    ) -> Result<Message> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            context: context.to_vec(),
        });

        let next = if model == self.judge_model {
            self.verdicts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("false".to_string()))
        } else {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".to_string()))
        };

        next.map(|content| Message::assistant(content, dialog_id.clone()))
    }
}

/// In-memory store that starts failing writes after `allowed_writes`.
pub struct FlakyStore {
    pub inner: MemoryMessageStore,
    allowed_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new(allowed_writes: usize) -> Self {
        Self {
            inner: MemoryMessageStore::new(),
            allowed_writes: AtomicUsize::new(allowed_writes),
        }
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn messages_by_dialog(&self, dialog_id: &DialogId) -> Result<Vec<Message>> {
        self.inner.messages_by_dialog(dialog_id).await
    }

    async fn store_message(&self, message: &Message) -> Result<()> {
        let remaining = self.allowed_writes.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(DialogError::storage("disk full"));
        }
        self.allowed_writes.store(remaining - 1, Ordering::SeqCst);
        self.inner.store_message(message).await
    }

    async fn remove_dialog(&self, dialog_id: &DialogId) -> Result<u64> {
        self.inner.remove_dialog(dialog_id).await
    }

    async fn list_dialog_ids(&self) -> Result<Vec<DialogId>> {
        self.inner.list_dialog_ids().await
    }
}
