//! Console transport: stdout stands in for the chat, a directory for uploads.

use std::path::PathBuf;

use async_trait::async_trait;
use murmur_core::TransportError;
use murmur_core::domain::{Artifact, Submitter};
use murmur_core::ports::{StatusSink, Transport};
use tracing::info;

/// "Sends" audio by copying it into `outbox`.
pub struct ConsoleTransport {
    outbox: PathBuf,
}

impl ConsoleTransport {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }

    fn destination(&self, artifact: &Artifact, to: &Submitter) -> Result<PathBuf, TransportError> {
        let name = artifact.path().file_name().ok_or_else(|| {
            TransportError::Send(format!("{} has no file name", artifact.path().display()))
        })?;
        Ok(self
            .outbox
            .join(format!("{}_{}", to.id, name.to_string_lossy())))
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn deliver(&self, artifact: &Artifact, to: &Submitter) -> Result<(), TransportError> {
        let destination = self.destination(artifact, to)?;
        tokio::fs::create_dir_all(&self.outbox).await?;
        let bytes = tokio::fs::copy(artifact.path(), &destination).await?;

        info!(submitter = %to, bytes, path = %destination.display(), "audio delivered");
        println!("🎧 {to}: audio saved to {}", destination.display());
        Ok(())
    }

    async fn notify(&self, to: &Submitter, text: &str) -> Result<(), TransportError> {
        println!("💬 {to}: {text}");
        Ok(())
    }
}

/// Status line for one request, printed with the request number.
pub struct ConsoleSink {
    label: String,
}

impl ConsoleSink {
    pub fn new(request: u64) -> Self {
        Self {
            label: format!("#{request}"),
        }
    }
}

#[async_trait]
impl StatusSink for ConsoleSink {
    async fn update(&self, text: &str) -> Result<(), TransportError> {
        println!("   [{}] {text}", self.label);
        Ok(())
    }
}
