//! Dialog orchestrator: the per-turn control loop.
//!
//! A turn moves through
//! `AwaitingInput -> InputReceived -> TerminationChecked -> ContextTrimmed
//! -> AwaitingCompletion -> Persisting -> Reported` and back to
//! `AwaitingInput`. End of input or a true termination verdict closes the
//! session.

use jess_core::{CompletionProvider, DialogError, DialogId, Message, MessageStore, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::{ContextBuilder, TerminationJudge, render_history, trim_messages};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Your name is: Jess. You are an AI developer assistant who helps with software development.";
pub const DEFAULT_TERMINATION_INSTRUCTION: &str =
    "Based on the last response from the user, is this dialog over? Respond with true/false only.";
pub const DEFAULT_CONTEXT_CHAR_BUDGET: usize = 10_000;

const PROMPT: &str = "You: ";
const FAREWELL: &str = "Goodbye!";

/// Configuration for dialog orchestration.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Model used for conversation replies
    pub chat_model: String,
    /// Cheaper model used for the termination check
    pub judge_model: String,
    /// Framing message prepended to every request
    pub system_prompt: String,
    /// Question appended for the termination check
    pub termination_instruction: String,
    /// Maximum characters of conversation content sent per request
    pub context_char_budget: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            termination_instruction: DEFAULT_TERMINATION_INSTRUCTION.to_string(),
            context_char_budget: DEFAULT_CONTEXT_CHAR_BUDGET,
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    #[must_use]
    pub fn with_judge_model(mut self, model: impl Into<String>) -> Self {
        self.judge_model = model.into();
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub const fn with_context_char_budget(mut self, budget: usize) -> Self {
        self.context_char_budget = budget;
        self
    }
}

/// What a single turn produced.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Reply received; user message and reply are persisted unless the
    /// dialog is the ad hoc sentinel.
    Replied(Message),
    /// The judge declared the dialog finished. Nothing was persisted.
    DialogOver,
    /// The termination check failed. Nothing was persisted.
    JudgeFailed(DialogError),
    /// The completion failed. Nothing was persisted; the session may continue.
    CompletionFailed(DialogError),
}

/// Why an interactive session stopped without a fatal error.
#[derive(Debug)]
pub enum SessionEnd {
    InputClosed,
    DialogOver,
    /// The termination check failed and the session was closed.
    Aborted(DialogError),
}

/// Ties the judge, trimmer, context builder, provider and store together.
pub struct DialogOrchestrator<P = Arc<dyn CompletionProvider>, S = Arc<dyn MessageStore>>
where
    P: Send + Sync,
    S: Send + Sync,
{
    provider: P,
    store: S,
    config: ConversationConfig,
    builder: ContextBuilder,
    judge: TerminationJudge,
}

impl<P, S> DialogOrchestrator<P, S>
where
    P: CompletionProvider + Send + Sync,
    S: MessageStore + Send + Sync,
{
    pub fn new(provider: P, store: S, config: ConversationConfig) -> Self {
        let builder = ContextBuilder::new(config.system_prompt.clone());
        let judge = TerminationJudge::new(
            builder.clone(),
            config.judge_model.clone(),
            config.termination_instruction.clone(),
        );

        Self {
            provider,
            store,
            config,
            builder,
            judge,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run an interactive dialog until input ends or the dialog is judged over.
    ///
    /// Existing history is rendered first. Only storage and terminal IO
    /// failures are returned as errors.
    pub async fn run_dialog<R, W>(
        &self,
        dialog_id: &DialogId,
        input: R,
        output: &mut W,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut conversation = self.store.messages_by_dialog(dialog_id).await?;
        info!(
            "Starting dialog {} with {} stored messages",
            dialog_id,
            conversation.len()
        );
        for line in render_history(&conversation) {
            writeln!(output, "{line}")?;
        }

        let mut lines = input.lines();
        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(output, "\n{FAREWELL}")?;
                info!("Input closed, ending dialog {}", dialog_id);
                return Ok(SessionEnd::InputClosed);
            };

            if line.trim().is_empty() {
                continue;
            }

            match self.process_turn(&mut conversation, dialog_id, &line).await? {
                TurnOutcome::Replied(reply) => {
                    writeln!(output, "{}: {}", reply.role(), reply.content())?;
                }
                TurnOutcome::DialogOver => {
                    writeln!(output, "{FAREWELL}")?;
                    return Ok(SessionEnd::DialogOver);
                }
                TurnOutcome::JudgeFailed(err) => {
                    writeln!(output, "Error: {err}")?;
                    return Ok(SessionEnd::Aborted(err));
                }
                TurnOutcome::CompletionFailed(err) => {
                    writeln!(output, "Error: {err}")?;
                }
            }
        }
    }

    /// Process one user turn against the in-memory `conversation`.
    ///
    /// On every outcome other than [`TurnOutcome::Replied`] the conversation
    /// is left as it was and the store is not written. The ad hoc sentinel
    /// dialog is never written either. A storage failure while persisting is
    /// returned as `Err`.
    pub async fn process_turn(
        &self,
        conversation: &mut Vec<Message>,
        dialog_id: &DialogId,
        text: &str,
    ) -> Result<TurnOutcome> {
        let user_message = Message::user(text, dialog_id.clone());
        conversation.push(user_message.clone());
        debug!("Dialog {}: input received", dialog_id);

        match self
            .judge
            .is_over(&self.provider, conversation, dialog_id)
            .await
        {
            Ok(false) => {}
            Ok(true) => {
                conversation.pop();
                info!("Dialog {} judged over", dialog_id);
                return Ok(TurnOutcome::DialogOver);
            }
            Err(err) => {
                conversation.pop();
                warn!("Termination check failed for dialog {}: {err}", dialog_id);
                return Ok(TurnOutcome::JudgeFailed(err));
            }
        }

        let reply = match self.request_reply(conversation, dialog_id).await {
            Ok(reply) => reply,
            Err(err) => {
                conversation.pop();
                warn!("Completion failed for dialog {}: {err}", dialog_id);
                return Ok(TurnOutcome::CompletionFailed(err));
            }
        };
        conversation.push(reply.clone());

        if dialog_id.is_ad_hoc() {
            debug!("Dialog {} is ad hoc, turn kept in memory only", dialog_id);
        } else {
            debug!("Dialog {}: persisting turn", dialog_id);
            self.store.store_message(&user_message).await?;
            self.store.store_message(&reply).await?;
        }

        info!(
            "Dialog {} now has {} messages",
            dialog_id,
            conversation.len()
        );
        Ok(TurnOutcome::Replied(reply))
    }

    /// One-off question without termination check or persistence.
    ///
    /// With a dialog id, that dialog's stored history is used as context;
    /// without one, the ad hoc sentinel dialog is used.
    pub async fn ask(&self, text: &str, dialog_id: Option<&DialogId>) -> Result<String> {
        let (mut conversation, dialog_id) = match dialog_id {
            Some(id) => (self.store.messages_by_dialog(id).await?, id.clone()),
            None => (Vec::new(), DialogId::ad_hoc()),
        };
        conversation.push(Message::user(text, dialog_id.clone()));

        let reply = self.request_reply(&conversation, &dialog_id).await?;
        Ok(reply.into_content())
    }

    async fn request_reply(&self, conversation: &[Message], dialog_id: &DialogId) -> Result<Message> {
        let trimmed = trim_messages(conversation, self.config.context_char_budget);
        let context = self.builder.build(&trimmed, dialog_id, None);
        debug!(
            "Dialog {}: requesting completion with {} context messages",
            dialog_id,
            context.len()
        );

        self.provider
            .complete(&context, &self.config.chat_model, dialog_id)
            .await
    }
}
