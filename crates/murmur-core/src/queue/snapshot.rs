use std::sync::Arc;

use crate::domain::Task;

/// 1-based position shown to a submitter for the pending task at `index`.
///
/// Counts every task ahead of it, including the one in flight, if any.
pub fn display_position(index: usize, busy: bool) -> usize {
    index + 1 + usize::from(busy)
}

/// Consistent copy of the queue at one instant.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub pending: Vec<Arc<Task>>,
    pub current: Option<Arc<Task>>,
    pub capacity: usize,
}

impl QueueSnapshot {
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Pending tasks plus one if a task is in flight.
    pub fn occupied(&self) -> usize {
        self.pending.len() + usize::from(self.is_busy())
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.occupied())
    }

    /// Pending tasks with their display positions, in FIFO order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &Arc<Task>)> {
        let busy = self.is_busy();
        self.pending
            .iter()
            .enumerate()
            .map(move |(i, task)| (display_position(i, busy), task))
    }
}
