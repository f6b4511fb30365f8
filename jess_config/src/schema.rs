use jess_conversation::{
    ConversationConfig, DEFAULT_CHAT_MODEL, DEFAULT_CONTEXT_CHAR_BUDGET, DEFAULT_JUDGE_MODEL,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TERMINATION_INSTRUCTION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::credentials::{CredentialProvider, EnvCredentials, KeyFileCredentials, default_key_file};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub dialog: DialogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub credentials: CredentialSource,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "CompletionConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "CompletionConfig::default_chat_model")]
    pub chat_model: String,
    #[serde(default = "CompletionConfig::default_judge_model")]
    pub judge_model: String,
    #[serde(default = "CompletionConfig::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            chat_model: Self::default_chat_model(),
            judge_model: Self::default_judge_model(),
            max_tokens: Self::default_max_tokens(),
            request_timeout_secs: None,
        }
    }
}

impl CompletionConfig {
    fn default_api_base() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_chat_model() -> String {
        DEFAULT_CHAT_MODEL.to_string()
    }

    fn default_judge_model() -> String {
        DEFAULT_JUDGE_MODEL.to_string()
    }

    const fn default_max_tokens() -> u32 {
        2000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DialogConfig {
    #[serde(default = "DialogConfig::default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "DialogConfig::default_termination_instruction")]
    pub termination_instruction: String,
    #[serde(default = "DialogConfig::default_context_char_budget")]
    pub context_char_budget: usize,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            system_prompt: Self::default_system_prompt(),
            termination_instruction: Self::default_termination_instruction(),
            context_char_budget: Self::default_context_char_budget(),
        }
    }
}

impl DialogConfig {
    fn default_system_prompt() -> String {
        DEFAULT_SYSTEM_PROMPT.to_string()
    }

    fn default_termination_instruction() -> String {
        DEFAULT_TERMINATION_INSTRUCTION.to_string()
    }

    const fn default_context_char_budget() -> usize {
        DEFAULT_CONTEXT_CHAR_BUDGET
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Defaults to `~/.jess/messages.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_dir()?.join("messages.db")),
        }
    }
}

/// Where the bearer token comes from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Text file holding the key; defaults to `~/.open-ai.key`.
    KeyFile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Env { var: String },
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::KeyFile { path: None }
    }
}

impl CredentialSource {
    pub fn provider(&self) -> anyhow::Result<Box<dyn CredentialProvider>> {
        Ok(match self {
            Self::KeyFile { path: Some(path) } => Box::new(KeyFileCredentials::new(path.clone())),
            Self::KeyFile { path: None } => Box::new(KeyFileCredentials::new(default_key_file()?)),
            Self::Env { var } => Box::new(EnvCredentials::new(var.clone())),
        })
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(".jess"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/.jess/config.json`, falling back to defaults when it is absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", config_path.display())
        })?;

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    #[must_use]
    pub fn conversation_config(&self) -> ConversationConfig {
        ConversationConfig {
            chat_model: self.completion.chat_model.clone(),
            judge_model: self.completion.judge_model.clone(),
            system_prompt: self.dialog.system_prompt.clone(),
            termination_instruction: self.dialog.termination_instruction.clone(),
            context_char_budget: self.dialog.context_char_budget,
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");
        Self::create_config_at(&config_path)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Put your OpenAI API key in ~/.open-ai.key, or switch");
        println!("      \"credentials\" to {{\"source\": \"env\", \"var\": \"OPENAI_API_KEY\"}}");
        println!("   2. Run 'jess dialog --continue <name>' to start a conversation");
        println!();
        println!("Configuration options:");
        println!("   - completion.chat_model: model used for replies");
        println!("   - completion.judge_model: cheaper model deciding when a dialog is over");
        println!("   - dialog.context_char_budget: characters of history sent per request");
        println!();
        Ok(())
    }

    /// Write the default template to `config_path`; never overwrites.
    pub fn create_config_at(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(config_path, template)?;
        Ok(())
    }
}
