use async_trait::async_trait;
use clubrag_core::{RagError, RagResult};

use crate::embedding::{EmbeddingConfig, EmbeddingProvider};

/// Embeddings from any OpenAI-compatible `/v1/embeddings` endpoint.
pub struct OpenAiEmbedding {
    config: EmbeddingConfig,
    http: reqwest::Client,
}

impl OpenAiEmbedding {
    /// Create a client for the configured endpoint.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .pop()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.config.base_url());
        let body = serde_json::json!({
            "model": self.config.model_id,
            "input": texts,
            "dimensions": self.config.dimension,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        if !status.is_success() {
            return Err(RagError::Embedding(format!(
                "embedding API error {status}: {resp_body}"
            )));
        }

        parse_embedding_response(&resp_body, texts.len(), self.config.dimension)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

/// Extract `expected` vectors of width `dimension` from an embeddings
/// response, ordered by `index`.
pub fn parse_embedding_response(
    body: &serde_json::Value,
    expected: usize,
    dimension: usize,
) -> RagResult<Vec<Vec<f32>>> {
    let data = body["data"]
        .as_array()
        .ok_or_else(|| RagError::Embedding("response has no `data` array".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (fallback, item) in data.iter().enumerate() {
        let index = item["index"]
            .as_u64()
            .map_or(fallback, |i| i as usize);
        let values = item["embedding"].as_array().ok_or_else(|| {
            RagError::Embedding(format!("item {index} has no `embedding` array"))
        })?;
        let vector = values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| RagError::Embedding(format!("item {index} has non-numeric values")))?;
        if vector.len() != dimension {
            return Err(RagError::Embedding(format!(
                "item {index} has {} values, configured dimension is {dimension}",
                vector.len()
            )));
        }
        indexed.push((index, vector));
    }
    indexed.sort_by_key(|(index, _)| *index);

    if indexed.len() != expected {
        return Err(RagError::Embedding(format!(
            "expected {expected} embeddings, got {}",
            indexed.len()
        )));
    }
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}
