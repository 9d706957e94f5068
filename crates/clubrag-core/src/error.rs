use std::path::PathBuf;

use thiserror::Error;

/// A convenience `Result` alias using [`RagError`].
pub type RagResult<T> = Result<T, RagError>;

/// Top-level error type for clubrag.
///
/// Every variant is recoverable: a failure degrades the quality of the
/// generated content, it never has to bring the process down.
#[derive(Error, Debug)]
pub enum RagError {
    /// The organization profile is missing or is not a JSON object.
    #[error("Profile load error: {0}")]
    ProfileLoad(String),

    /// The embedding provider failed or returned unusable vectors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The generative text provider failed. Callers should ask the user to try again.
    #[error("Generation error: {0}")]
    Generation(String),

    /// No snapshot exists at the given path.
    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    /// A snapshot exists but does not decode into a consistent engine state.
    #[error("Snapshot corrupt: {0}")]
    SnapshotCorrupt(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Transport-level failure talking to a remote provider.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Re-tag an error coming out of an embedding provider as [`RagError::Embedding`].
    pub fn into_embedding(self) -> Self {
        match self {
            RagError::Embedding(_) => self,
            other => RagError::Embedding(other.to_string()),
        }
    }

    /// Re-tag an error coming out of a generative provider as [`RagError::Generation`].
    pub fn into_generation(self) -> Self {
        match self {
            RagError::Generation(_) => self,
            other => RagError::Generation(other.to_string()),
        }
    }

    /// Whether a snapshot failure can be recovered by re-ingesting the profile.
    pub fn is_snapshot_failure(&self) -> bool {
        matches!(
            self,
            RagError::SnapshotNotFound(_) | RagError::SnapshotCorrupt(_)
        )
    }
}
