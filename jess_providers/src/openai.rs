use async_trait::async_trait;
use jess_core::{CompletionProvider, Credentials, DialogError, DialogId, Message, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::wire::{ChatRequest, ChatResponse};

/// Transport-level knobs for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    /// Base URL; requests go to `{api_base}/chat/completions`.
    pub api_base: String,
    /// Token ceiling for each reply.
    pub max_tokens: u32,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            max_tokens: 2000,
            request_timeout: None,
        }
    }
}

/// Completion Client for OpenAI-compatible chat-completion endpoints.
pub struct OpenAiClient {
    client: Client,
    credentials: Credentials,
    settings: CompletionSettings,
}

impl OpenAiClient {
    pub fn new(credentials: Credentials, settings: CompletionSettings) -> Result<Self> {
        info!("Creating OpenAiClient for {}", settings.api_base);
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DialogError::transport)?;

        Ok(Self {
            client,
            credentials,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credentials.bearer_token())
            .json(request)
            .send()
            .await
            .map_err(DialogError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(DialogError::transport)?;

        if !status.is_success() {
            return Err(DialogError::Transport(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| DialogError::Transport(format!("malformed response body: {e}")))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(
        &self,
        context: &[Message],
        model: &str,
        dialog_id: &DialogId,
    ) -> Result<Message> {
        let request = ChatRequest::new(context, model, self.settings.max_tokens);

        info!(
            "Sending completion request: model={}, messages={}",
            model,
            request.messages.len()
        );

        let response = self.send(&request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(DialogError::EmptyResponse)?;
        let content = choice.message.content.ok_or_else(|| {
            DialogError::Parse("first choice carries no message content".to_string())
        })?;

        info!("Received completion for dialog {}", dialog_id);
        Ok(Message::assistant(content, dialog_id.clone()))
    }
}
