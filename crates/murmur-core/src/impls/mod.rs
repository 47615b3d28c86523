//! Impls - in-process adapters for the ports.
//!
//! - **LocalArtifactStore**: artifacts as files in a local directory
//! - **ProcStatusProbe**: resident memory from procfs
//!
//! The synthesis engine and the chat transport live with the binary that
//! wires them up.

pub mod local_artifacts;
pub mod proc_memory;

pub use self::local_artifacts::LocalArtifactStore;
pub use self::proc_memory::ProcStatusProbe;
