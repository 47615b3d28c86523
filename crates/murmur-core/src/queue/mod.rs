//! Queue module: bounded FIFO, worker slot, and read-only snapshots.

mod bounded;
mod snapshot;
mod state;

pub use bounded::{Admission, BoundedQueue};
pub use snapshot::{QueueSnapshot, display_position};
pub use state::LoopState;
