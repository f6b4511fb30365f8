use jess_config::Config;
use jess_conversation::{SessionEnd, show_history};
use jess_core::{DialogId, MessageStore};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

/// Exactly one of the `dialog` subcommand's actions.
#[derive(Debug, Clone)]
pub enum DialogAction {
    List,
    Continue(DialogId),
    Show(DialogId),
    Delete(DialogId),
}

#[derive(Debug, Clone)]
pub struct DialogInput {
    pub action: DialogAction,
    /// Overrides the configured credential source
    pub key_file: Option<PathBuf>,
}

/// Strategy for managing stored dialogs and running the interactive loop.
#[derive(Debug, Clone, Copy)]
pub struct DialogStrategy;

impl super::CommandStrategy for DialogStrategy {
    type Input = DialogInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        match input.action {
            DialogAction::List => {
                let store = super::open_store(&config).await?;
                for dialog_id in store.list_dialog_ids().await? {
                    println!("{dialog_id}");
                }
            }
            DialogAction::Show(dialog_id) => {
                let store = super::open_store(&config).await?;
                for line in show_history(&*store, &dialog_id).await? {
                    println!("{line}");
                }
            }
            DialogAction::Delete(dialog_id) => {
                let store = super::open_store(&config).await?;
                let removed = store.remove_dialog(&dialog_id).await?;
                info!("Removed {} messages from dialog {}", removed, dialog_id);
                println!("Deleted dialog {dialog_id} ({removed} messages)");
            }
            DialogAction::Continue(dialog_id) => {
                println!("Starting a new conversation...");
                let orchestrator =
                    super::build_orchestrator(&config, input.key_file.as_deref()).await?;

                let stdin = BufReader::new(tokio::io::stdin());
                let mut stdout = std::io::stdout();
                match orchestrator.run_dialog(&dialog_id, stdin, &mut stdout).await? {
                    SessionEnd::InputClosed | SessionEnd::DialogOver => {}
                    SessionEnd::Aborted(err) => {
                        anyhow::bail!("Dialog {dialog_id} aborted: {err}");
                    }
                }
            }
        }

        Ok(())
    }
}
