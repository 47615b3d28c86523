//! Synthesizer port - the speech engine.

use crate::domain::Artifact;
use crate::error::SynthesisError;

/// Turns text into an audio artifact.
///
/// Implementations are blocking and may run for minutes. The worker calls
/// them from a blocking thread and never overlaps two calls, so they need not
/// be safe for concurrent use beyond `Send + Sync`.
pub trait Synthesizer: Send + Sync + 'static {
    fn synthesize(&self, text: &str) -> Result<Artifact, SynthesisError>;
}
