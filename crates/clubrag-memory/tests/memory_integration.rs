#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the clubrag-memory crate.
//!
//! Covers profile chunking end to end, embedding + index search ordering,
//! snapshot persistence of real embeddings, and the HTTP embedding backend
//! against a mock server.

use clubrag_core::{OrganizationProfile, RagError};
use clubrag_memory::{
    Chunk, ChunkingPolicy, DocumentStore, EmbeddingProvider, LocalEmbedding, Snapshot,
    VectorIndex, TRENDING_SECTION,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CLUB_PROFILE: &str = r#"{
    "name": "Robotics Club",
    "about": "We build robots.\n\nWeekly meetings Tuesdays.",
    "mission": "Teach students to design, build and program autonomous machines.",
    "founded": 2019,
    "keywords": ["robotics", "AI"]
}"#;

async fn build(store: &DocumentStore, embedder: &dyn EmbeddingProvider) -> VectorIndex {
    let rows = embedder.embed_batch(&store.contents()).await.unwrap();
    VectorIndex::from_rows(rows).unwrap()
}

// ---------------------------------------------------------------------------
// 1. Chunking
// ---------------------------------------------------------------------------

#[test]
fn profile_chunks_in_document_order() {
    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let chunks = ChunkingPolicy::default().chunk_profile(&profile);
    let sections: Vec<&str> = chunks.iter().map(Chunk::section).collect();
    assert_eq!(
        sections,
        vec!["name", "about", "about", "mission", "keywords"]
    );
}

#[test]
fn strict_policy_drops_short_sections() {
    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let policy = ChunkingPolicy {
        min_paragraph_chars: 20,
        ..ChunkingPolicy::default()
    };
    let chunks = policy.chunk_profile(&profile);
    let contents: Vec<&str> = chunks.iter().map(Chunk::content).collect();
    assert_eq!(
        contents,
        vec![
            "Weekly meetings Tuesdays.",
            "Teach students to design, build and program autonomous machines.",
            "Company keywords: robotics, AI"
        ]
    );
}

#[test]
fn trend_chunks_append_after_profile() {
    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let policy = ChunkingPolicy::default();
    let store = DocumentStore::from_chunks(policy.chunk_profile(&profile));
    let tags: Vec<String> = (0..11).map(|i| format!("#tag{i}")).collect();
    let grown = store.appended(policy.chunk_trends(&tags));

    assert_eq!(grown.len(), store.len() + 2);
    assert_eq!(&grown.chunks()[..store.len()], store.chunks());
    assert_eq!(
        grown.chunks().last().unwrap().content(),
        "Trending hashtags: #tag10"
    );
    assert_eq!(grown.chunks().last().unwrap().section(), TRENDING_SECTION);
}

// ---------------------------------------------------------------------------
// 2. Embedding + index
// ---------------------------------------------------------------------------

#[tokio::test]
async fn robots_query_finds_robots_paragraph() {
    let profile = OrganizationProfile::from_json_str(
        r#"{"about": "We build robots.\n\nWeekly meetings Tuesdays.", "keywords": ["robotics","AI"]}"#,
    )
    .unwrap();
    let store = DocumentStore::from_chunks(ChunkingPolicy::default().chunk_profile(&profile));
    let embedder = LocalEmbedding::default();
    let index = build(&store, &embedder).await;

    let query = embedder.embed("robots").await.unwrap();
    let hits = index.nearest(&query, 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(
        store.get(hits[0].position).unwrap().content(),
        "We build robots."
    );
}

#[tokio::test]
async fn nearest_is_sorted_and_bounded() {
    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let store = DocumentStore::from_chunks(ChunkingPolicy::default().chunk_profile(&profile));
    let embedder = LocalEmbedding::default();
    let index = build(&store, &embedder).await;
    assert_eq!(index.len(), store.len());

    let query = embedder.embed("autonomous machines for students").await.unwrap();
    for k in 1..=store.len() + 2 {
        let hits = index.nearest(&query, k).unwrap();
        assert_eq!(hits.len(), k.min(store.len()));
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(hits.iter().all(|h| h.position < store.len()));
    }
}

#[tokio::test]
async fn rebuilding_from_same_store_is_identical() {
    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let store = DocumentStore::from_chunks(ChunkingPolicy::default().chunk_profile(&profile));
    let embedder = LocalEmbedding::default();
    assert_eq!(build(&store, &embedder).await, build(&store, &embedder).await);
}

// ---------------------------------------------------------------------------
// 3. Snapshot persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_roundtrip_preserves_search() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("company_rag.snapshot");

    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let store = DocumentStore::from_chunks(ChunkingPolicy::default().chunk_profile(&profile));
    let embedder = LocalEmbedding::default();
    let index = build(&store, &embedder).await;
    let query = embedder.embed("weekly meetings").await.unwrap();
    let before = index.nearest(&query, 3).unwrap();

    Snapshot {
        store: store.clone(),
        index: Some(index),
        profile: profile.clone(),
    }
    .write(&path)
    .await
    .unwrap();

    let restored = Snapshot::read(&path).await.unwrap();
    assert_eq!(restored.store, store);
    assert_eq!(restored.profile, profile);
    let after = restored.index.unwrap().nearest(&query, 3).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn snapshot_torn_write_is_detected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("company_rag.snapshot");

    let profile = OrganizationProfile::from_json_str(CLUB_PROFILE).unwrap();
    let store = DocumentStore::from_chunks(ChunkingPolicy::default().chunk_profile(&profile));
    let index = build(&store, &LocalEmbedding::default()).await;
    let snap = Snapshot {
        store,
        index: Some(index),
        profile,
    };
    let bytes = snap.encode().unwrap();
    tokio::fs::write(&path, &bytes[..bytes.len() / 2]).await.unwrap();

    let err = Snapshot::read(&path).await.unwrap_err();
    assert!(matches!(err, RagError::SnapshotCorrupt(_)));
}

// ---------------------------------------------------------------------------
// 4. HTTP embeddings
// ---------------------------------------------------------------------------

#[cfg(feature = "http-embeddings")]
mod http {
    use super::*;
    use clubrag_memory::{EmbeddingBackend, EmbeddingConfig, OpenAiEmbedding};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: EmbeddingBackend::OpenAi,
            dimension: 2,
            model_id: "text-embedding-3-small".to_string(),
            api_key: "sk-test".to_string(),
            api_base_url: Some(server.uri()),
        }
    }

    #[tokio::test]
    async fn openai_embedding_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({"dimensions": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 0, "embedding": [1.0, 0.0]},
                    {"index": 1, "embedding": [0.0, 1.0]}
                ]
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedding::new(config(&server));
        let vecs = embedder.embed_batch(&["a", "b"]).await.unwrap();
        assert_eq!(vecs, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(embedder.dimension(), 2);
    }

    #[tokio::test]
    async fn openai_embedding_wrong_width() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3, 0.4]}]
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedding::new(config(&server));
        let err = embedder.embed("a").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(ref m) if m.contains("dimension")));
    }

    #[tokio::test]
    async fn openai_embedding_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "quota exceeded"}
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedding::new(config(&server));
        let err = embedder.embed("a").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(ref m) if m.contains("429")));
    }
}
