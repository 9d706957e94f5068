use super::TextGenerator;
use crate::config::ModelConfig;
use async_trait::async_trait;
use clubrag_core::{RagError, RagResult};

/// Google Gemini `generateContent` backend.
pub struct GeminiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    async fn complete(&self, prompt: &str) -> RagResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model_id
        );

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
            }
        });

        tracing::debug!(model = %self.config.model_id, prompt_len = prompt.len(), "Gemini request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
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
                "Gemini API error {status}: {resp_body}"
            )));
        }

        parse_gemini_response(&resp_body)
    }
}

/// Concatenate the text parts of the first candidate.
pub fn parse_gemini_response(body: &serde_json::Value) -> RagResult<String> {
    let Some(parts) = body["candidates"][0]["content"]["parts"].as_array() else {
        let reason = body["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(RagError::Generation(format!(
            "Gemini returned no content: {reason}"
        )));
    };

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(RagError::Generation(
            "Gemini response contained no text parts".to_string(),
        ));
    }
    Ok(text)
}
