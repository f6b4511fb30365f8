//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a separate strategy type with its own input, dispatched
//! statically from `main`.

use jess_config::{Config, CredentialProvider, KeyFileCredentials};
use jess_conversation::DialogOrchestrator;
use jess_core::{CompletionProvider, Credentials, MessageStore};
use jess_providers::{CompletionSettings, OpenAiClient};
use jess_store::SqliteMessageStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod ask;
mod dialog;
mod file;
mod init;
mod version;

pub use ask::{AskInput, AskStrategy};
pub use dialog::{DialogAction, DialogInput, DialogStrategy};
pub use file::{FileInput, FileStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, so parameters are passed without
/// runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Open the configured message database.
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn MessageStore>> {
    let db_path = config.storage.resolve_database_path()?;
    info!("Database path: {}", db_path.display());

    let store: Arc<dyn MessageStore> = Arc::new(SqliteMessageStore::open(&db_path).await?);
    Ok(store)
}

/// `--key-file` wins over the configured credential source.
fn resolve_credentials(config: &Config, key_file: Option<&Path>) -> anyhow::Result<Credentials> {
    match key_file {
        Some(path) => KeyFileCredentials::new(path.to_path_buf()).resolve(),
        None => config.credentials.provider()?.resolve(),
    }
}

/// Wire the completion client, message store and conversation settings.
async fn build_orchestrator(
    config: &Config,
    key_file: Option<&Path>,
) -> anyhow::Result<DialogOrchestrator> {
    let credentials = resolve_credentials(config, key_file)?;
    let settings = CompletionSettings {
        api_base: config.completion.api_base.clone(),
        max_tokens: config.completion.max_tokens,
        request_timeout: config.completion.request_timeout_secs.map(Duration::from_secs),
    };
    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::new(credentials, settings)?);
    let store = open_store(config).await?;

    info!(
        "Using chat model {} and judge model {}",
        config.completion.chat_model, config.completion.judge_model
    );
    Ok(DialogOrchestrator::new(
        provider,
        store,
        config.conversation_config(),
    ))
}
