//! How a task ends. Every variant is terminal for that task only.

use serde::{Deserialize, Serialize};

/// Result of the delivery sequence for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    /// Handed to the submitter on attempt number `attempts`.
    Delivered { attempts: u32 },
    /// Every attempt failed.
    Failed { attempts: u32 },
    /// The artifact vanished before an attempt; no further retries.
    Missing,
}

/// Terminal outcome of one task, as recorded by the worker loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    Delivered { attempts: u32 },
    GenerationFailed(String),
    DeliveryFailed { attempts: u32 },
    ArtifactMissing,
    /// Something escaped the per-task handlers (a panic).
    Faulted,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Delivered { .. })
    }
}

impl From<DeliveryOutcome> for TaskOutcome {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Delivered { attempts } => TaskOutcome::Delivered { attempts },
            DeliveryOutcome::Failed { attempts } => TaskOutcome::DeliveryFailed { attempts },
            DeliveryOutcome::Missing => TaskOutcome::ArtifactMissing,
        }
    }
}
