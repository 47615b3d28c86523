//! Bounded FIFO with a single in-flight slot.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{LoopState, QueueSnapshot};
use crate::domain::Task;
use crate::error::SubmitError;

struct QueueState {
    pending: VecDeque<Arc<Task>>,
    /// The task being synthesized/delivered. `Some` means busy.
    current: Option<Arc<Task>>,
    /// A worker loop owns the queue. Flipped only under the lock, together
    /// with the pending/current changes that justify it.
    draining: bool,
}

impl QueueState {
    fn occupied(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }
}

/// Result of a successful admission.
#[derive(Debug)]
pub struct Admission {
    pub task: Arc<Task>,
    /// 1-based position at admission time (`occupied + 1`).
    pub position: usize,
    /// The loop was idle and the caller must start it.
    pub start_worker: bool,
}

/// Admission control over pending + in-flight tasks.
///
/// Invariant: `pending.len() + busy <= capacity` at every instant. Each
/// operation takes the lock once and never holds it across an await, so
/// submitters and status readers never wait on the worker.
pub struct BoundedQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    loop_state: watch::Sender<LoopState>,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        let (loop_state, _) = watch::channel(LoopState::Idle);
        Self {
            capacity,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                current: None,
                draining: false,
            }),
            loop_state,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // No critical section can leave the state half-updated, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `task` at the tail unless every slot is taken.
    pub fn admit(&self, task: Task) -> Result<Admission, SubmitError> {
        let mut state = self.lock();
        let occupied = state.occupied();
        if occupied >= self.capacity {
            return Err(SubmitError::QueueFull {
                capacity: self.capacity,
            });
        }

        let task = Arc::new(task);
        state.pending.push_back(Arc::clone(&task));

        let start_worker = !state.draining;
        if start_worker {
            state.draining = true;
            self.loop_state.send_replace(LoopState::Draining);
        }

        Ok(Admission {
            task,
            position: occupied + 1,
            start_worker,
        })
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.lock();
        QueueSnapshot {
            pending: state.pending.iter().cloned().collect(),
            current: state.current.clone(),
            capacity: self.capacity,
        }
    }

    pub fn loop_state(&self) -> LoopState {
        *self.loop_state.borrow()
    }

    /// Resolves once no loop is draining the queue.
    pub async fn wait_idle(&self) {
        let mut rx = self.loop_state.subscribe();
        // The sender lives as long as `self`, so this cannot error.
        let _ = rx.wait_for(|state| *state == LoopState::Idle).await;
    }

    /// Move the head task into the in-flight slot.
    ///
    /// When nothing is pending the loop gives up ownership in the same
    /// critical section, so a concurrent `admit` either sees the loop still
    /// draining (and the task gets picked up) or sees it idle (and starts a
    /// new one).
    pub(crate) fn begin_next(&self) -> Option<Arc<Task>> {
        let mut state = self.lock();
        debug_assert!(state.current.is_none(), "single in-flight task");
        match state.pending.pop_front() {
            Some(task) => {
                state.current = Some(Arc::clone(&task));
                Some(task)
            }
            None => {
                state.draining = false;
                self.loop_state.send_replace(LoopState::Idle);
                None
            }
        }
    }

    /// Clear the in-flight slot and return what is left.
    pub(crate) fn finish_current(&self) -> QueueSnapshot {
        let mut state = self.lock();
        state.current = None;
        QueueSnapshot {
            pending: state.pending.iter().cloned().collect(),
            current: None,
            capacity: self.capacity,
        }
    }

    /// Abnormal loop exit: drop the in-flight slot and loop ownership.
    pub(crate) fn release_loop(&self) {
        let mut state = self.lock();
        state.current = None;
        if state.draining {
            state.draining = false;
            self.loop_state.send_replace(LoopState::Idle);
        }
    }

    /// Claim loop ownership if work is pending and nobody is draining.
    pub(crate) fn try_restart(&self) -> bool {
        let mut state = self.lock();
        if state.draining || state.pending.is_empty() {
            return false;
        }
        state.draining = true;
        self.loop_state.send_replace(LoopState::Draining);
        true
    }

    /// Reset a busy flag left behind without a running loop.
    ///
    /// A busy slot owned by a live loop is real work and stays.
    pub(crate) fn clear_stale_busy(&self) -> bool {
        let mut state = self.lock();
        if state.draining || state.current.is_none() {
            return false;
        }
        state.current = None;
        true
    }

    #[cfg(test)]
    pub(crate) fn force_stale_busy(&self, task: Task) {
        let mut state = self.lock();
        state.current = Some(Arc::new(task));
    }
}
