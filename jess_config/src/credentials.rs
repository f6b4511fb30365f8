//! Resolving the bearer token before a dialog starts.

use jess_core::Credentials;
use std::path::PathBuf;
use tracing::debug;

/// A capability that yields the API credentials.
pub trait CredentialProvider {
    fn resolve(&self) -> anyhow::Result<Credentials>;
}

/// `~/.open-ai.key`
pub fn default_key_file() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
        .join(".open-ai.key"))
}

/// Reads the key from a text file, dropping every newline.
#[derive(Debug, Clone)]
pub struct KeyFileCredentials {
    path: PathBuf,
}

impl KeyFileCredentials {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialProvider for KeyFileCredentials {
    fn resolve(&self) -> anyhow::Result<Credentials> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            anyhow::anyhow!("Cannot read API key file {}: {e}", self.path.display())
        })?;
        let key = content.replace(['\n', '\r'], "");
        if key.trim().is_empty() {
            anyhow::bail!("API key file {} is empty", self.path.display());
        }

        debug!("Loaded API key from {}", self.path.display());
        Ok(Credentials::new(key))
    }
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    #[must_use]
    pub const fn new(var: String) -> Self {
        Self { var }
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self) -> anyhow::Result<Credentials> {
        let key = std::env::var(&self.var)
            .map_err(|e| anyhow::anyhow!("Cannot read API key from ${}: {e}", self.var))?;
        if key.trim().is_empty() {
            anyhow::bail!("Environment variable ${} is empty", self.var);
        }

        debug!("Loaded API key from ${}", self.var);
        Ok(Credentials::new(key))
    }
}
