use jess_config::Config;
use jess_core::DialogId;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AskInput {
    pub message: String,
    /// Dialog whose stored history is sent as context
    pub dialog: Option<DialogId>,
    pub key_file: Option<PathBuf>,
}

/// Strategy for a single question without termination check or persistence.
#[derive(Debug, Clone, Copy)]
pub struct AskStrategy;

impl super::CommandStrategy for AskStrategy {
    type Input = AskInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let orchestrator = super::build_orchestrator(&config, input.key_file.as_deref()).await?;

        let reply = orchestrator
            .ask(&input.message, input.dialog.as_ref())
            .await?;
        println!("{reply}");
        Ok(())
    }
}
