use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;
use crate::ports::StatusSink;

/// Who asked for the task. Opaque to the queue apart from the display name,
/// which shows up in status reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Submitter {
    pub id: String,
    pub display_name: String,
}

impl Submitter {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Submitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_name.fmt(f)
    }
}

/// One admitted synthesis request.
///
/// Everything but the sink is fixed at admission. The sink is the only way
/// the worker talks back to the submitter about this task.
pub struct Task {
    id: TaskId,
    text: String,
    submitter: Submitter,
    created_at: DateTime<Utc>,
    sink: Arc<dyn StatusSink>,
}

impl Task {
    pub fn new(
        id: TaskId,
        text: String,
        submitter: Submitter,
        created_at: DateTime<Utc>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            id,
            text,
            submitter,
            created_at,
            sink,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Push a status line to the submitter. Sink failures are logged and dropped.
    pub async fn report(&self, text: &str) {
        if let Err(e) = self.sink.update(text).await {
            tracing::warn!(task_id = %self.id, error = %e, "status update failed");
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("submitter", &self.submitter)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
