use std::path::PathBuf;

use thiserror::Error;

/// Admission failures. None of them leave a trace in the queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("text too short: {actual} characters, minimum is {min}")]
    TooShort { min: usize, actual: usize },

    #[error("queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("too many requests, try again shortly")]
    RateLimited,
}

/// Failures of the synthesis collaborator.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis failed: {0}")]
    Failed(String),

    #[error("synthesis produced an empty artifact: {}", .0.display())]
    EmptyArtifact(PathBuf),

    #[error("synthesis panicked")]
    Panicked,
}

/// Failures reported by the chat transport (delivery, notifications, status edits).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("destination unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Startup configuration errors. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("required resource not found: {}", .0.display())]
    MissingResource(PathBuf),
}
