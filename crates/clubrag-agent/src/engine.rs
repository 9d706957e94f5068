use std::path::Path;
use std::sync::Arc;

use clubrag_core::{
    collect_hashtags, EventDetails, OrganizationProfile, RagError, RagResult, TrendItem,
};
use clubrag_memory::{
    Chunk, ChunkingPolicy, DocumentStore, EmbeddingProvider, Snapshot, VectorIndex,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backends::TextGenerator;
use crate::prompt::{build_content_prompt, ContentPrompt, DEFAULT_ORGANIZATION};

/// How many chunks ground each generated piece of content.
pub const CONTEXT_CHUNKS: usize = 3;

/// Everything a [`RagEngine`] needs; there is no process-wide state.
#[derive(Clone)]
pub struct RagEngineConfig {
    /// Turns chunk and query text into vectors.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Turns the assembled prompt into content.
    pub generator: Arc<dyn TextGenerator>,
    /// Paragraph threshold and trend batch size.
    pub chunking: ChunkingPolicy,
}

/// A retrieved chunk with its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matching chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance; smaller is closer.
    pub distance: f32,
    /// Position of the chunk in the document store.
    pub position: usize,
}

/// Counters describing the engine's current knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Chunks in the document store.
    pub chunks: usize,
    /// Rows in the vector index (always equal to `chunks`).
    pub indexed: usize,
    /// Embedding width, if the index exists.
    pub dimension: Option<usize>,
    /// Sections in the organization profile.
    pub profile_sections: usize,
}

#[derive(Default)]
struct KnowledgeState {
    store: DocumentStore,
    index: Option<VectorIndex>,
    profile: OrganizationProfile,
}

/// Retrieval-augmented content engine.
///
/// Owns the document store, the vector index derived from it, and the
/// organization profile. Every mutation re-embeds the whole store and swaps
/// store and index together, only after embedding succeeded, so a failed
/// mutation leaves the previous state intact. Mutations hold the write lock
/// for the duration of the embedding call, which serializes rebuilds; searches
/// share the read lock.
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    chunking: ChunkingPolicy,
    state: RwLock<KnowledgeState>,
}

impl RagEngine {
    /// Create an empty engine.
    pub fn new(config: RagEngineConfig) -> RagResult<Self> {
        config.chunking.validate()?;
        Ok(Self {
            embedder: config.embedder,
            generator: config.generator,
            chunking: config.chunking,
            state: RwLock::new(KnowledgeState::default()),
        })
    }

    /// Read a profile file and ingest it.
    ///
    /// A missing or malformed file fails with [`RagError::ProfileLoad`] and
    /// leaves the engine untouched.
    pub async fn load_profile(&self, path: &Path) -> RagResult<usize> {
        let profile = OrganizationProfile::load(path).await.inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Organization profile not loaded");
        })?;
        info!(path = %path.display(), sections = profile.len(), "Loaded organization profile");
        self.ingest_profile(profile).await
    }

    /// Replace the whole store with chunks derived from `profile` and rebuild
    /// the index. Returns the number of chunks.
    pub async fn ingest_profile(&self, profile: OrganizationProfile) -> RagResult<usize> {
        let store = DocumentStore::from_chunks(self.chunking.chunk_profile(&profile));

        let mut state = self.state.write().await;
        let index = self.build_index(&store).await?;
        let count = store.len();
        *state = KnowledgeState {
            store,
            index,
            profile,
        };

        info!(chunks = count, "Ingested organization profile");
        Ok(count)
    }

    /// Append trending hashtags in batches and rebuild the index.
    ///
    /// Empty input is a no-op. Returns the number of chunks added.
    pub async fn add_trend_signals(&self, hashtags: &[String]) -> RagResult<usize> {
        if hashtags.is_empty() {
            return Ok(0);
        }
        let added = self.chunking.chunk_trends(hashtags);
        let count = added.len();

        let mut state = self.state.write().await;
        let store = state.store.appended(added);
        let index = self.build_index(&store).await?;
        state.store = store;
        state.index = index;

        info!(
            hashtags = hashtags.len(),
            chunks_added = count,
            total = state.store.len(),
            "Added trend signals"
        );
        Ok(count)
    }

    /// Append the hashtags carried by trend records, deduplicated in first-seen order.
    pub async fn add_trend_items(&self, items: &[TrendItem]) -> RagResult<usize> {
        self.add_trend_signals(&collect_hashtags(items)).await
    }

    /// Recompute the index from the current store.
    pub async fn rebuild(&self) -> RagResult<()> {
        let mut state = self.state.write().await;
        let index = self.build_index(&state.store).await?;
        state.index = index;
        Ok(())
    }

    /// The `k` chunks nearest to `query`, nearest first, ties in store order.
    ///
    /// An empty index or `k == 0` yields an empty result, not an error.
    pub async fn search(&self, query: &str, k: usize) -> RagResult<Vec<SearchResult>> {
        let state = self.state.read().await;
        self.search_in(&state, query, k).await
    }

    /// Draft content for `event`, grounded in the most relevant knowledge.
    ///
    /// Retrieval and generation run on every call. A provider failure is
    /// returned as [`RagError::Generation`]; nothing is retried or invented.
    pub async fn generate_content(
        &self,
        event: &EventDetails,
        hashtags: &[String],
        trends: &[TrendItem],
    ) -> RagResult<String> {
        // One guard for retrieval and the name so both come from the same state.
        let (context, organization) = {
            let state = self.state.read().await;
            let context = match event.retrieval_query() {
                Some(query) => self
                    .search_in(&state, &query, CONTEXT_CHUNKS)
                    .await?
                    .iter()
                    .map(|r| r.chunk.content())
                    .collect::<Vec<_>>()
                    .join("\n"),
                None => String::new(),
            };
            let organization = state
                .profile
                .name()
                .unwrap_or(DEFAULT_ORGANIZATION)
                .to_string();
            (context, organization)
        };

        let prompt = build_content_prompt(&ContentPrompt {
            organization: &organization,
            context: &context,
            event,
            hashtags,
            trends,
        });
        debug!(prompt_len = prompt.len(), "Generating content");

        self.generator
            .complete(&prompt)
            .await
            .map_err(RagError::into_generation)
            .inspect_err(|e| warn!(error = %e, "Content generation failed"))
    }

    /// Write store, embeddings and profile to `path`, replacing any previous snapshot.
    pub async fn persist(&self, path: &Path) -> RagResult<()> {
        let snapshot = {
            let state = self.state.read().await;
            Snapshot {
                store: state.store.clone(),
                index: state.index.clone(),
                profile: state.profile.clone(),
            }
        };
        snapshot.write(path).await?;
        info!(path = %path.display(), chunks = snapshot.store.len(), "Persisted knowledge snapshot");
        Ok(())
    }

    /// Replace the engine state with a snapshot, without re-embedding.
    ///
    /// Fails with [`RagError::SnapshotNotFound`] or [`RagError::SnapshotCorrupt`]
    /// and leaves the current state unchanged. A snapshot whose embedding width
    /// differs from the configured provider's is treated as corrupt, since its
    /// rows could never be compared with new query embeddings.
    pub async fn restore(&self, path: &Path) -> RagResult<usize> {
        let snapshot = Snapshot::read(path).await?;
        if let Some(index) = &snapshot.index {
            let expected = self.embedder.dimension();
            if index.dimension() != expected {
                return Err(RagError::SnapshotCorrupt(format!(
                    "snapshot embeddings have dimension {}, provider produces {expected}",
                    index.dimension()
                )));
            }
        }

        let count = snapshot.store.len();
        let mut state = self.state.write().await;
        *state = KnowledgeState {
            store: snapshot.store,
            index: snapshot.index,
            profile: snapshot.profile,
        };

        info!(path = %path.display(), chunks = count, "Restored knowledge snapshot");
        Ok(count)
    }

    /// A copy of the chunks in store order.
    pub async fn chunks(&self) -> Vec<Chunk> {
        self.state.read().await.store.chunks().to_vec()
    }

    /// A copy of the organization profile.
    pub async fn profile(&self) -> OrganizationProfile {
        self.state.read().await.profile.clone()
    }

    /// Number of chunks in the store.
    pub async fn len(&self) -> usize {
        self.state.read().await.store.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.store.is_empty()
    }

    /// Number of rows in the vector index.
    pub async fn index_len(&self) -> usize {
        self.state
            .read()
            .await
            .index
            .as_ref()
            .map_or(0, VectorIndex::len)
    }

    /// Summary counters.
    pub async fn stats(&self) -> EngineStats {
        let state = self.state.read().await;
        EngineStats {
            chunks: state.store.len(),
            indexed: state.index.as_ref().map_or(0, VectorIndex::len),
            dimension: state.index.as_ref().map(VectorIndex::dimension),
            profile_sections: state.profile.len(),
        }
    }

    async fn search_in(
        &self,
        state: &KnowledgeState,
        query: &str,
        k: usize,
    ) -> RagResult<Vec<SearchResult>> {
        let Some(index) = state.index.as_ref() else {
            warn!("Knowledge base is empty; search returned no results");
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RagError::into_embedding)?;
        let neighbors = index.nearest(&query_embedding, k)?;

        neighbors
            .into_iter()
            .map(|n| {
                let chunk = state.store.get(n.position).cloned().ok_or_else(|| {
                    RagError::Embedding(format!("index row {} has no chunk", n.position))
                })?;
                Ok(SearchResult {
                    chunk,
                    distance: n.distance,
                    position: n.position,
                })
            })
            .collect()
    }

    /// Embed every chunk in one batched call and build a fresh index.
    async fn build_index(&self, store: &DocumentStore) -> RagResult<Option<VectorIndex>> {
        if store.is_empty() {
            warn!("Document store is empty; no index created");
            return Ok(None);
        }

        let rows = self
            .embedder
            .embed_batch(&store.contents())
            .await
            .map_err(RagError::into_embedding)?;
        if rows.len() != store.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} embeddings for {} chunks",
                rows.len(),
                store.len()
            )));
        }
        let expected = self.embedder.dimension();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(RagError::Embedding(format!(
                "embedding {i} has dimension {}, provider declares {expected}",
                row.len()
            )));
        }

        let index = VectorIndex::from_rows(rows)?;
        info!(
            rows = index.len(),
            dimension = index.dimension(),
            "Index built"
        );
        Ok(Some(index))
    }
}
