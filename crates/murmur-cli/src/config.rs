use std::path::{Path, PathBuf};

use clap::Parser;
use murmur_core::{ConfigError, QueueConfig};
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "murmur")]
#[command(about = "Console front-end for the murmur speech synthesis queue", long_about = None)]
pub struct Args {
    /// JSON config file
    #[arg(long, env = "MURMUR_CONFIG", default_value = "murmur.json")]
    pub config: PathBuf,

    /// Directory delivered audio is copied into
    #[arg(long, env = "MURMUR_OUTBOX", default_value = "outbox")]
    pub outbox: PathBuf,

    /// Name the console user is greeted with
    #[arg(long, env = "USER", default_value = "friend")]
    pub user: String,
}

/// Config file contents: queue settings plus the engine command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub queue: QueueConfig,

    /// argv template; `{text}`, `{voice}` and `{output}` are substituted.
    pub synthesis_command: Vec<String>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.synthesis_command.is_empty() {
            return Err(ConfigError::Invalid {
                key: "synthesis_command",
                message: "must name a program".to_string(),
            });
        }
        if !self.synthesis_command.iter().any(|arg| arg.contains("{output}")) {
            return Err(ConfigError::Invalid {
                key: "synthesis_command",
                message: "must contain an {output} placeholder".to_string(),
            });
        }
        self.queue.validate()
    }
}
