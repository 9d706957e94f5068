use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use clubrag_core::{RagError, RagResult};
use serde::{Deserialize, Serialize};

/// Capability for turning text into fixed-length vectors.
///
/// Implementations must be deterministic for a given model version and report
/// failures as [`RagError::Embedding`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute embedding vector for a single text.
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Compute embeddings for a batch of texts, one vector per input, in order.
    async fn embed_batch(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimension of the embedding vectors produced by this provider.
    fn dimension(&self) -> usize;
}

/// Which embedding backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Offline hashing embedder.
    #[default]
    Local,
    /// Any OpenAI-compatible `/v1/embeddings` endpoint.
    OpenAi,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend to use.
    #[serde(default)]
    pub provider: EmbeddingBackend,
    /// Vector width. Remote models are asked for this width and rows of any
    /// other width are rejected.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Remote model identifier.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Remote API key.
    #[serde(default)]
    pub api_key: String,
    /// Override for the remote base URL.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_dimension() -> usize {
    256
}

fn default_model_id() -> String {
    "text-embedding-3-small".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::default(),
            dimension: default_dimension(),
            model_id: default_model_id(),
            api_key: String::new(),
            api_base_url: None,
        }
    }
}

impl EmbeddingConfig {
    /// Base URL of the remote endpoint.
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
    }
}

/// Build the configured embedding provider.
pub fn build_embedder(config: &EmbeddingConfig) -> RagResult<Arc<dyn EmbeddingProvider>> {
    if config.dimension == 0 {
        return Err(RagError::Config(
            "embedding dimension must be at least 1".to_string(),
        ));
    }
    match config.provider {
        EmbeddingBackend::Local => Ok(Arc::new(LocalEmbedding::new(config.dimension))),
        #[cfg(feature = "http-embeddings")]
        EmbeddingBackend::OpenAi => Ok(Arc::new(crate::openai::OpenAiEmbedding::new(
            config.clone(),
        ))),
        #[cfg(not(feature = "http-embeddings"))]
        EmbeddingBackend::OpenAi => Err(RagError::Config(
            "the openai embedding backend requires the `http-embeddings` feature".to_string(),
        )),
    }
}

/// Local bag-of-words embedding (no external API needed).
///
/// Words are hashed into a fixed number of buckets weighted by term frequency,
/// then L2-normalized. Deterministic across runs and platforms.
pub struct LocalEmbedding {
    dimension: usize,
}

impl LocalEmbedding {
    /// Create an embedder producing vectors of `dimension` values.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

impl Default for LocalEmbedding {
    fn default() -> Self {
        Self::new(default_dimension())
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedding {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding("Cannot embed empty text".to_string()));
        }

        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 1)
            .collect();

        let mut freq: BTreeMap<&str, f32> = BTreeMap::new();
        for word in &words {
            *freq.entry(*word).or_insert(0.0) += 1.0;
        }

        let total = words.len() as f32;
        if total == 0.0 {
            return Ok(vector);
        }

        // Three hash positions per word spread collisions out.
        for (word, count) in &freq {
            let tf = count / total;
            let hash1 = fnv1a(word.as_bytes()) as usize;
            let hash2 = fnv1a(&[word.as_bytes(), &[1u8]].concat()) as usize;
            let hash3 = fnv1a(&[word.as_bytes(), &[2u8]].concat()) as usize;

            vector[hash1 % self.dimension] += tf;
            vector[hash2 % self.dimension] += tf * 0.7;
            vector[hash3 % self.dimension] += tf * 0.5;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// FNV-1a, 32 bit.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
