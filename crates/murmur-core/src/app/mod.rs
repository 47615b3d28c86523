//! App - the queue service assembled from ports.
//!
//! # Components
//! - **Dispatcher**: entry point for the transport (submit, status, welcome, fault hook)
//! - **DispatcherBuilder**: wiring and startup validation
//! - **WorkerLoop**: single-concurrency processing loop
//! - **Deliverer**: artifact delivery with bounded retries
//! - **StatusReporter**: queue/position/memory text

pub mod builder;
pub mod delivery;
pub mod dispatcher;
pub mod messages;
pub mod rate_limit;
pub mod status;
pub mod worker_loop;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::delivery::{ArtifactGuard, Deliverer, RetryPolicy};
pub use self::dispatcher::{Dispatcher, Receipt};
pub use self::rate_limit::RateLimiter;
pub use self::status::{MemoryGauge, StatusReporter};
pub use self::worker_loop::WorkerLoop;
