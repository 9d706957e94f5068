use std::ffi::OsString;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use clubrag_core::{OrganizationProfile, RagError, RagResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::chunk::Chunk;
use crate::index::VectorIndex;
use crate::store::DocumentStore;

const FORMAT_TAG: &str = "clubrag-snapshot";
const FORMAT_VERSION: u32 = 1;

/// Durable copy of the knowledge state: chunks, their embeddings, and the profile.
///
/// On disk a snapshot is one JSON header line followed by the JSON payload.
/// The header carries the payload length and SHA-256, so a torn or tampered
/// file is reported as [`RagError::SnapshotCorrupt`] instead of loading
/// partial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Chunks in store order.
    pub store: DocumentStore,
    /// One row per chunk, or `None` when the store is empty.
    pub index: Option<VectorIndex>,
    /// The profile the store was ingested from.
    pub profile: OrganizationProfile,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    version: u32,
    saved_at: DateTime<Utc>,
    payload_len: usize,
    checksum: String,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    chunks: &'a [Chunk],
    embeddings: Option<EncodedMatrix>,
    profile: &'a OrganizationProfile,
}

#[derive(Deserialize)]
struct Payload {
    chunks: Vec<Chunk>,
    embeddings: Option<EncodedMatrix>,
    profile: OrganizationProfile,
}

/// Embedding matrix as base64 little-endian `f32`, row-major. Bit-exact.
#[derive(Serialize, Deserialize)]
struct EncodedMatrix {
    rows: usize,
    dimension: usize,
    data: String,
}

impl EncodedMatrix {
    fn encode(index: &VectorIndex) -> Self {
        let bytes: Vec<u8> = index
            .as_flat()
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        Self {
            rows: index.len(),
            dimension: index.dimension(),
            data: STANDARD.encode(bytes),
        }
    }

    fn decode(&self) -> RagResult<VectorIndex> {
        let bytes = STANDARD
            .decode(&self.data)
            .map_err(|e| corrupt(format!("embedding matrix is not valid base64: {e}")))?;
        let expected = self
            .rows
            .checked_mul(self.dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| corrupt("embedding matrix shape overflows"))?;
        if bytes.len() != expected {
            return Err(corrupt(format!(
                "embedding matrix holds {} bytes, {}x{} needs {expected}",
                bytes.len(),
                self.rows,
                self.dimension
            )));
        }
        let data: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        VectorIndex::from_flat(self.dimension, data).map_err(|e| corrupt(e.to_string()))
    }
}

fn corrupt(msg: impl Into<String>) -> RagError {
    RagError::SnapshotCorrupt(msg.into())
}

impl Snapshot {
    /// Serialize to the on-disk byte layout.
    pub fn encode(&self) -> RagResult<Vec<u8>> {
        let payload = serde_json::to_vec(&PayloadRef {
            chunks: self.store.chunks(),
            embeddings: self.index.as_ref().map(EncodedMatrix::encode),
            profile: &self.profile,
        })?;
        let header = Header {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            payload_len: payload.len(),
            checksum: hex::encode(Sha256::digest(&payload)),
        };

        let mut out = serde_json::to_vec(&header)?;
        out.push(b'\n');
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Parse and validate the on-disk byte layout.
    pub fn decode(bytes: &[u8]) -> RagResult<Self> {
        let split = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| corrupt("missing snapshot header"))?;
        let (header_bytes, rest) = bytes.split_at(split);
        let payload = &rest[1..];

        let header: Header = serde_json::from_slice(header_bytes)
            .map_err(|e| corrupt(format!("unreadable header: {e}")))?;
        if header.format != FORMAT_TAG {
            return Err(corrupt(format!("unknown format '{}'", header.format)));
        }
        if header.version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported snapshot version {}",
                header.version
            )));
        }
        if payload.len() != header.payload_len {
            return Err(corrupt(format!(
                "payload is {} bytes, header says {}",
                payload.len(),
                header.payload_len
            )));
        }
        if hex::encode(Sha256::digest(payload)) != header.checksum {
            return Err(corrupt("checksum mismatch"));
        }

        let payload: Payload = serde_json::from_slice(payload)
            .map_err(|e| corrupt(format!("unreadable payload: {e}")))?;

        let index = payload
            .embeddings
            .as_ref()
            .map(EncodedMatrix::decode)
            .transpose()?;
        let rows = index.as_ref().map_or(0, VectorIndex::len);
        if rows != payload.chunks.len() {
            return Err(corrupt(format!(
                "{rows} embedding rows for {} chunks",
                payload.chunks.len()
            )));
        }

        Ok(Self {
            store: DocumentStore::from_chunks(payload.chunks),
            index,
            profile: payload.profile,
        })
    }

    /// Write the snapshot to `path`, replacing any existing file.
    ///
    /// The bytes go to a sibling `.tmp` file which is synced and then renamed
    /// over `path`, so a crash leaves either the old or the new snapshot.
    pub async fn write(&self, path: &Path) -> RagResult<()> {
        let bytes = self.encode()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = tmp_path(path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub async fn read(path: &Path) -> RagResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RagError::SnapshotNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::decode(&bytes)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
