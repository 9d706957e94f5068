//! Retrieval-augmented content generation for clubs and organizations.
//!
//! [`RagEngine`] keeps the organization's knowledge in a vector index, grounds
//! each request in the closest chunks, and hands the assembled prompt to a
//! [`TextGenerator`] backend.

pub mod backends;
pub mod config;
pub mod engine;
pub mod prompt;

pub use backends::{build_generator, TextGenerator};
pub use config::{LlmProvider, ModelConfig};
pub use engine::{EngineStats, RagEngine, RagEngineConfig, SearchResult, CONTEXT_CHUNKS};
pub use prompt::{build_content_prompt, ContentPrompt};
