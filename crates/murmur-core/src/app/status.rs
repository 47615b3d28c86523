//! Status - human-readable queue reports.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::domain::Task;
use crate::ports::MemoryProbe;
use crate::queue::{BoundedQueue, QueueSnapshot};

/// Memory reading refreshed at most once per `refresh`.
pub struct MemoryGauge {
    probe: Arc<dyn MemoryProbe>,
    refresh: Duration,
    cache: Mutex<Option<(Instant, f64)>>,
}

impl MemoryGauge {
    pub fn new(probe: Arc<dyn MemoryProbe>, refresh: Duration) -> Self {
        Self {
            probe,
            refresh,
            cache: Mutex::new(None),
        }
    }

    /// Resident memory in MB, or `None` when it cannot be measured.
    pub fn read(&self) -> Option<f64> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((taken_at, value)) = *cache
            && taken_at.elapsed() <= self.refresh
        {
            return Some(value);
        }
        let value = self.probe.resident_mb()?;
        *cache = Some((Instant::now(), value));
        Some(value)
    }
}

/// Derives status text from queue snapshots. Never touches queue state.
pub struct StatusReporter {
    queue: Arc<BoundedQueue>,
    memory: MemoryGauge,
}

impl StatusReporter {
    pub fn new(queue: Arc<BoundedQueue>, memory: MemoryGauge) -> Self {
        Self { queue, memory }
    }

    /// Full report for the status command.
    pub fn report(&self) -> String {
        let snapshot = self.queue.snapshot();
        let mut lines = vec!["📊 System status:".to_string()];

        lines.push(if snapshot.is_busy() {
            "🟡 Generating".to_string()
        } else {
            "🟢 Idle".to_string()
        });
        lines.push(slot_line(&snapshot));
        if let Some(current) = &snapshot.current {
            lines.push(current_line(current));
        }
        if snapshot.pending.is_empty() {
            lines.push("📋 No pending tasks in the queue".to_string());
        } else {
            lines.push(format!("📋 Pending tasks ({}):", snapshot.pending.len()));
            lines.extend(pending_lines(&snapshot));
        }
        if let Some(mb) = self.memory.read() {
            lines.push(format!("💾 Memory usage: {mb:.1} MB"));
        }
        lines.join("\n")
    }

    /// Short queue summary, used in the welcome text.
    pub fn summary(&self) -> String {
        let snapshot = self.queue.snapshot();
        if snapshot.occupied() == 0 {
            return format!(
                "📋 Queue is empty ({} slots available)",
                snapshot.capacity
            );
        }

        let mut out = slot_line(&snapshot);
        if let Some(current) = &snapshot.current {
            let _ = write!(out, "\n{}", current_line(current));
        }
        if !snapshot.pending.is_empty() {
            let _ = write!(out, "\n📋 Pending tasks ({}):", snapshot.pending.len());
            for line in pending_lines(&snapshot) {
                let _ = write!(out, "\n{line}");
            }
        }
        out
    }
}

fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

fn slot_line(snapshot: &QueueSnapshot) -> String {
    format!(
        "📋 Queue slots: {} of {} (free: {})",
        snapshot.occupied(),
        snapshot.capacity,
        snapshot.remaining()
    )
}

fn current_line(task: &Task) -> String {
    format!(
        "🔄 Now generating: request from {} (added {})",
        task.submitter(),
        clock_time(task.created_at())
    )
}

fn pending_lines(snapshot: &QueueSnapshot) -> impl Iterator<Item = String> + '_ {
    snapshot.positions().map(|(position, task)| {
        format!(
            "   {position}. ⏳ Waiting: request from {} (added {})",
            task.submitter(),
            clock_time(task.created_at())
        )
    })
}
