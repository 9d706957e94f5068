//! Knowledge store for retrieval-augmented content generation.
//!
//! Turns an organization profile and trend signals into an ordered set of
//! text chunks, embeds them, and answers exact nearest-neighbour queries.
//! State can be snapshotted to disk and restored without re-embedding.
//!
//! # Main types
//!
//! - [`Chunk`]: A piece of text plus its provenance section.
//! - [`ChunkingPolicy`]: Paragraph threshold and trend batch size.
//! - [`DocumentStore`]: Ordered chunk collection; position is the index key.
//! - [`EmbeddingProvider`]: Trait for turning text into vectors.
//! - [`LocalEmbedding`]: Offline hashing embedder.
//! - [`VectorIndex`]: Dense embedding matrix with brute-force Euclidean search.
//! - [`Snapshot`]: Checksummed on-disk copy of store, matrix and profile.

/// Chunks and the chunking policy.
pub mod chunk;
/// Embedding provider trait and local implementation.
pub mod embedding;
/// Exact Euclidean nearest-neighbour index.
pub mod index;
/// OpenAI-compatible embedding backend.
#[cfg(feature = "http-embeddings")]
pub mod openai;
/// Snapshot persistence.
pub mod snapshot;
/// Ordered document store.
pub mod store;

pub use chunk::{split_paragraphs, Chunk, ChunkingPolicy, TRENDING_SECTION};
pub use embedding::{
    build_embedder, EmbeddingBackend, EmbeddingConfig, EmbeddingProvider, LocalEmbedding,
};
pub use index::{squared_euclidean, Neighbor, VectorIndex};
#[cfg(feature = "http-embeddings")]
pub use openai::OpenAiEmbedding;
pub use snapshot::Snapshot;
pub use store::DocumentStore;
