//! murmur-core
//!
//! Single-worker, bounded job queue for long-running speech synthesis requests.
//!
//! # Modules
//! - **domain**: task model (ids, task, artifact, outcome)
//! - **ports**: seams to the outside world (Synthesizer, Transport, StatusSink, ArtifactStore, Clock, MemoryProbe)
//! - **queue**: bounded FIFO with admission control and the busy/current slot
//! - **app**: worker loop, delivery, status reporter, dispatcher and its builder
//! - **impls**: in-process adapters (local artifact directory, procfs memory probe)
//! - **config**: startup configuration
//! - **error**: error types

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod queue;

#[cfg(test)]
mod testing;

pub use app::{BuildError, Dispatcher, DispatcherBuilder, Receipt};
pub use config::QueueConfig;
pub use error::{ConfigError, SubmitError, SynthesisError, TransportError};
