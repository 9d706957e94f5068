use std::path::Path;

use clubrag_agent::RagEngine;
use clubrag_core::RagError;
use tracing::{info, warn};

/// How a session got its knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Loaded from the snapshot; holds the chunk count.
    Restored(usize),
    /// Rebuilt from the profile and saved; holds the chunk count.
    Rebuilt(usize),
}

/// Restore the last snapshot, or rebuild from the profile and save a fresh one.
///
/// A missing or unreadable profile leaves the store empty; the empty state is
/// still saved so later runs start from it.
pub async fn bootstrap(
    engine: &RagEngine,
    profile_path: &Path,
    snapshot_path: &Path,
) -> anyhow::Result<Bootstrap> {
    match engine.restore(snapshot_path).await {
        Ok(chunks) => {
            info!(chunks, "Knowledge base restored");
            Ok(Bootstrap::Restored(chunks))
        }
        Err(e) if e.is_snapshot_failure() => {
            warn!(error = %e, "Snapshot unavailable, rebuilding from profile");
            let chunks = match engine.load_profile(profile_path).await {
                Ok(chunks) => chunks,
                Err(RagError::ProfileLoad(msg)) => {
                    warn!(error = %msg, "Starting with an empty knowledge base");
                    0
                }
                Err(e) => return Err(e.into()),
            };
            engine.persist(snapshot_path).await?;
            Ok(Bootstrap::Rebuilt(chunks))
        }
        Err(e) => Err(e.into()),
    }
}
