pub mod claude;
pub mod gemini;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use clubrag_core::RagResult;

use crate::config::{LlmProvider, ModelConfig};

/// Capability for turning a prompt into generated text.
///
/// Each hosted provider implements this with a single request; retries and
/// deadlines are the caller's business.
///
/// To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `TextGenerator` for your struct
/// 3. Add the variant to `LlmProvider` in `config.rs`
/// 4. Wire it up in [`build_generator`]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the generated text verbatim.
    async fn complete(&self, prompt: &str) -> RagResult<String>;
}

/// Build the backend for the configured provider.
pub fn build_generator(config: ModelConfig) -> Arc<dyn TextGenerator> {
    match config.provider {
        LlmProvider::Gemini => Arc::new(gemini::GeminiBackend::new(config)),
        LlmProvider::Claude => Arc::new(claude::ClaudeBackend::new(config)),
        LlmProvider::OpenAi | LlmProvider::OpenRouter | LlmProvider::Groq => {
            Arc::new(openai::OpenAiBackend::new(config))
        }
    }
}
