mod env;
mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::vault::{VaultProvider, first_secret};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Config path from an explicit flag, else `SILENCIO_CONFIG`, else the default.
#[must_use]
pub fn resolve_config_path(cli: Option<&Path>) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    std::env::var("SILENCIO_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting values are invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.corpus.chunk_size == 0 {
            bail!("corpus.chunk_size must be greater than zero");
        }
        if self.corpus.chunk_overlap >= self.corpus.chunk_size {
            bail!(
                "corpus.chunk_overlap ({}) must be smaller than corpus.chunk_size ({})",
                self.corpus.chunk_overlap,
                self.corpus.chunk_size
            );
        }
        if self.corpus.embed_batch_size == 0 {
            bail!("corpus.embed_batch_size must be greater than zero");
        }
        if self.assistant.top_k == 0 {
            bail!("assistant.top_k must be greater than zero");
        }
        if self.assistant.max_context_chars == 0 {
            bail!("assistant.max_context_chars must be greater than zero");
        }
        if self.assistant.subject.trim().is_empty() {
            bail!("assistant.subject must not be empty");
        }
        if self.timeouts.llm_seconds == 0 || self.timeouts.embedding_seconds == 0 {
            bail!("timeouts must be greater than zero");
        }
        if self.gateway.rate_limit == 0 {
            bail!("gateway.rate_limit must be greater than zero");
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        self.secrets.gemini_api_key =
            first_secret(vault, &["SILENCIO_GEMINI_API_KEY", "GOOGLE_API_KEY"]).await?;
        self.secrets.openai_api_key = first_secret(vault, &["SILENCIO_OPENAI_API_KEY"]).await?;
        Ok(())
    }
}
