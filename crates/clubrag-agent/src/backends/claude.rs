use super::TextGenerator;
use crate::config::ModelConfig;
use async_trait::async_trait;
use clubrag_core::{RagError, RagResult};

/// Claude (Anthropic) API backend.
pub struct ClaudeBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeBackend {
    async fn complete(&self, prompt: &str) -> RagResult<String> {
        let url = format!("{}/v1/messages", self.config.base_url());

        let body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RagError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(RagError::Http(format!(
                "Claude API error {status}: {resp_body}"
            )));
        }

        parse_claude_response(&resp_body)
    }
}

/// Concatenate the `text` blocks of a Messages API response.
pub fn parse_claude_response(body: &serde_json::Value) -> RagResult<String> {
    let blocks = body["content"]
        .as_array()
        .ok_or_else(|| RagError::Generation("response has no content blocks".to_string()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect();
    if text.is_empty() {
        return Err(RagError::Generation(
            "response contained no text blocks".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_blocks() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "Reel: "}, {"type": "text", "text": "robot dance-off"}],
            "stop_reason": "end_turn"
        });
        assert_eq!(parse_claude_response(&body).unwrap(), "Reel: robot dance-off");
    }

    #[test]
    fn test_parse_no_text() {
        let body = serde_json::json!({"content": []});
        assert!(parse_claude_response(&body).is_err());
        assert!(parse_claude_response(&serde_json::json!({})).is_err());
    }
}
