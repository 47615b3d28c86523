//! Delivery of a synthesized artifact, with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::messages;
use crate::config::QueueConfig;
use crate::domain::{Artifact, DeliveryOutcome, Task};
use crate::ports::{ArtifactStore, Transport};

/// Retry policy for delivery attempts: fixed backoff between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::fixed(config.delivery_attempts, config.delivery_backoff())
    }
}

/// Owns an artifact and removes it on drop if it still exists.
///
/// Every path that ends an artifact's life goes through this drop, so removal
/// happens exactly once whatever branch the delivery took.
pub struct ArtifactGuard {
    artifact: Artifact,
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactGuard {
    pub fn new(artifact: Artifact, store: Arc<dyn ArtifactStore>) -> Self {
        Self { artifact, store }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn size(&self) -> Option<u64> {
        self.store.size(&self.artifact)
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.store.exists(&self.artifact) {
            return;
        }
        match self.store.remove(&self.artifact) {
            Ok(()) => debug!(path = %self.artifact.path().display(), "artifact removed"),
            Err(e) => warn!(
                path = %self.artifact.path().display(),
                error = %e,
                "failed to remove artifact"
            ),
        }
    }
}

pub struct Deliverer {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ArtifactStore>,
    policy: RetryPolicy,
}

impl Deliverer {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ArtifactStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Hand the artifact to the task's submitter.
    ///
    /// Failures are reported through the task's sink. The artifact is removed
    /// when `artifact` drops at the end of this call.
    pub async fn deliver(&self, artifact: ArtifactGuard, task: &Task) -> DeliveryOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;

            if !self.store.exists(artifact.artifact()) {
                warn!(task_id = %task.id(), attempt, "artifact missing before delivery");
                task.report(messages::ARTIFACT_MISSING).await;
                return DeliveryOutcome::Missing;
            }

            match self
                .transport
                .deliver(artifact.artifact(), task.submitter())
                .await
            {
                Ok(()) => {
                    info!(task_id = %task.id(), attempt, "artifact delivered");
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.policy.delay;
                    warn!(
                        task_id = %task.id(),
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(task_id = %task.id(), attempt, error = %e, "delivery failed, giving up");
                    task.report(messages::DELIVERY_FAILED).await;
                    return DeliveryOutcome::Failed { attempts: attempt };
                }
            }
        }
    }
}
