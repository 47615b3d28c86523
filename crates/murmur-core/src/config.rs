//! Startup configuration, read once from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Queue limits and timings.
///
/// Only the four limits are required; everything else has the documented
/// defaults (1s poll, 3 delivery attempts, 2s backoff, 10s memory cache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub max_text_length: usize,
    pub min_text_length: usize,
    pub max_queue_size: usize,
    /// Voice sample the engine clones. Must exist at startup.
    pub voice_reference: PathBuf,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_delivery_attempts")]
    pub delivery_attempts: u32,
    #[serde(default = "default_delivery_backoff_ms")]
    pub delivery_backoff_ms: u64,
    #[serde(default = "default_memory_refresh_secs")]
    pub memory_refresh_secs: u64,
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Global sliding-window limiter. Absent means disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub period_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_delivery_attempts() -> u32 {
    3
}

fn default_delivery_backoff_ms() -> u64 {
    2_000
}

fn default_memory_refresh_secs() -> u64 {
    10
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("temp_audio")
}

impl QueueConfig {
    /// Config with the given limits and default timings.
    pub fn new(
        max_text_length: usize,
        min_text_length: usize,
        max_queue_size: usize,
        voice_reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            max_text_length,
            min_text_length,
            max_queue_size,
            voice_reference: voice_reference.into(),
            poll_interval_ms: default_poll_interval_ms(),
            delivery_attempts: default_delivery_attempts(),
            delivery_backoff_ms: default_delivery_backoff_ms(),
            memory_refresh_secs: default_memory_refresh_secs(),
            artifact_dir: default_artifact_dir(),
            rate_limit: None,
        }
    }

    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that referenced resources exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_text_length == 0 {
            return Err(ConfigError::Invalid {
                key: "max_text_length",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid {
                key: "max_queue_size",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.min_text_length > self.max_text_length {
            return Err(ConfigError::Invalid {
                key: "min_text_length",
                message: format!(
                    "{} exceeds max_text_length {}",
                    self.min_text_length, self.max_text_length
                ),
            });
        }
        if self.delivery_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "delivery_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(limit) = &self.rate_limit
            && (limit.max_requests == 0 || limit.period_secs == 0)
        {
            return Err(ConfigError::Invalid {
                key: "rate_limit",
                message: "max_requests and period_secs must be greater than 0".to_string(),
            });
        }
        if !self.voice_reference.exists() {
            return Err(ConfigError::MissingResource(self.voice_reference.clone()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn delivery_backoff(&self) -> Duration {
        Duration::from_millis(self.delivery_backoff_ms)
    }

    pub fn memory_refresh(&self) -> Duration {
        Duration::from_secs(self.memory_refresh_secs)
    }
}
