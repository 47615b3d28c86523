//! Ports - seams to external collaborators.
//!
//! The queue core only talks to the synthesis engine, the chat transport, the
//! artifact storage and the process through these traits.

pub mod artifact_store;
pub mod clock;
pub mod memory;
pub mod synthesizer;
pub mod transport;

pub use self::artifact_store::ArtifactStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::memory::MemoryProbe;
pub use self::synthesizer::Synthesizer;
pub use self::transport::{StatusSink, Transport};
