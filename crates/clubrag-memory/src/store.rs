use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

/// Ordered collection of chunks.
///
/// Position is the join key into the vector index, so chunks are never
/// reordered or removed individually: the store only grows, or is replaced
/// wholesale by a fresh profile ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentStore {
    chunks: Vec<Chunk>,
}

impl DocumentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding exactly these chunks, in order.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// A copy of this store with `more` appended at the end.
    pub fn appended(&self, more: impl IntoIterator<Item = Chunk>) -> Self {
        let mut chunks = self.chunks.clone();
        chunks.extend(more);
        Self { chunks }
    }

    /// All chunks in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk at a store position.
    pub fn get(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    /// Chunk texts in store order, ready for a batched embedding call.
    pub fn contents(&self) -> Vec<&str> {
        self.chunks.iter().map(Chunk::content).collect()
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
