//! LocalArtifactStore - synthesized audio kept in a local directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::domain::Artifact;
use crate::ports::ArtifactStore;

/// Artifacts are plain files under `dir`. Paths are unique per call, so two
/// tasks never write the same file.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory and remove files left over from a previous run.
    ///
    /// Returns how many leftovers were removed.
    pub fn prepare(&self) -> io::Result<usize> {
        fs::create_dir_all(&self.dir)?;

        let mut swept = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => swept += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not remove leftover artifact")
                }
            }
        }
        if swept > 0 {
            info!(dir = %self.dir.display(), swept, "removed leftover artifacts");
        }
        Ok(swept)
    }

    /// Fresh output path: `audio_<timestamp>_<ulid>.wav`.
    pub fn next_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.dir.join(format!("audio_{stamp}_{}.wav", Ulid::new()))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn size(&self, artifact: &Artifact) -> Option<u64> {
        let meta = fs::metadata(artifact.path()).ok()?;
        meta.is_file().then(|| meta.len())
    }

    fn remove(&self, artifact: &Artifact) -> io::Result<()> {
        fs::remove_file(artifact.path())?;
        debug!(path = %artifact.path().display(), "artifact removed");
        Ok(())
    }
}
