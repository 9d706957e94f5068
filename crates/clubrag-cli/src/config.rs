use std::path::{Path, PathBuf};

use anyhow::Context;
use clubrag_agent::ModelConfig;
use clubrag_memory::{ChunkingPolicy, EmbeddingBackend, EmbeddingConfig};
use serde::Deserialize;

/// Contents of `clubrag.toml`. Every section is optional.
#[derive(Debug, Deserialize)]
pub struct ClubragConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chunking: ChunkingPolicy,
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("data/company_details.json")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/company_rag.snapshot")
}

impl Default for ClubragConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingPolicy::default(),
            profile_path: default_profile_path(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl ClubragConfig {
    /// Read the config file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        };
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.profile_path = resolve(base, &config.profile_path);
        config.snapshot_path = resolve(base, &config.snapshot_path);
        Ok(config)
    }

    /// Fill empty API keys from the provider's conventional variable.
    pub fn fill_api_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.model.api_key.is_empty() {
            if let Some(key) = lookup(self.model.provider.api_key_env()) {
                self.model.api_key = key;
            }
        }
        if self.embedding.provider == EmbeddingBackend::OpenAi && self.embedding.api_key.is_empty()
        {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.embedding.api_key = key;
            }
        }
    }
}

/// Relative paths in the file are relative to the file itself.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
