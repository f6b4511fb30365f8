use jess_config::Config;
use jess_conversation::FileInput as FilePrompt;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: PathBuf,
    pub prompt: Option<String>,
    /// Replace the prompt with the fixed refactoring instruction
    pub refactor: bool,
    pub key_file: Option<PathBuf>,
}

/// `--refactor` wins over any user prompt.
fn file_prompt(prompt: Option<String>, refactor: bool, content: String) -> FilePrompt {
    if refactor {
        FilePrompt::refactor(content)
    } else {
        FilePrompt::new(prompt.unwrap_or_default(), content)
    }
}

/// Strategy for a one-off request about the content of a file.
///
/// Runs on the ad hoc dialog; nothing is persisted.
#[derive(Debug, Clone, Copy)]
pub struct FileStrategy;

impl super::CommandStrategy for FileStrategy {
    type Input = FileInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&input.path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", input.path.display()))?;
        info!(
            "Read {} characters from {}",
            content.chars().count(),
            input.path.display()
        );

        let request = file_prompt(input.prompt, input.refactor, content);

        let config = Config::load()?;
        let orchestrator = super::build_orchestrator(&config, input.key_file.as_deref()).await?;
        let reply = orchestrator.ask(&request.to_prompt(), None).await?;
        println!("{reply}");

        Ok(())
    }
}
