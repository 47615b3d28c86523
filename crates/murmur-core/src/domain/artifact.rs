use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output of one synthesis run, awaiting delivery.
///
/// The worker owns it from the moment the synthesizer returns until delivery
/// finishes; it never outlives that attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
