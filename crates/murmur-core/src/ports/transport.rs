//! Transport port - the chat side.

use async_trait::async_trait;

use crate::domain::{Artifact, Submitter};
use crate::error::TransportError;

/// Delivery and free-form notifications towards a submitter.
///
/// Both calls can fail; callers must not assume otherwise.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, artifact: &Artifact, to: &Submitter) -> Result<(), TransportError>;

    async fn notify(&self, to: &Submitter, text: &str) -> Result<(), TransportError>;
}

/// Status line attached to one task (e.g. an editable chat message).
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn update(&self, text: &str) -> Result<(), TransportError>;
}
