//! Domain model: what a queued synthesis request is and how it ends.

pub mod artifact;
pub mod ids;
pub mod outcome;
pub mod task;

pub use artifact::Artifact;
pub use ids::TaskId;
pub use outcome::{DeliveryOutcome, TaskOutcome};
pub use task::{Submitter, Task};
