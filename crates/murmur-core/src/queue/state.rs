//! Worker loop state machine.

use serde::{Deserialize, Serialize};

/// State transitions:
/// - Idle -> Draining: a submission finds the loop idle, or recovery after a fault
///   finds pending work
/// - Draining -> Idle: the queue is empty after a task finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopState {
    Idle,
    Draining,
}
