//! ArtifactStore port - where synthesized files live until delivered.

use std::io;

use crate::domain::Artifact;

/// Existence, size and removal of artifacts.
///
/// Synchronous on purpose: removal runs from `Drop`.
pub trait ArtifactStore: Send + Sync {
    /// Size in bytes, or `None` if the artifact does not exist.
    fn size(&self, artifact: &Artifact) -> Option<u64>;

    fn remove(&self, artifact: &Artifact) -> io::Result<()>;

    fn exists(&self, artifact: &Artifact) -> bool {
        self.size(artifact).is_some()
    }
}
