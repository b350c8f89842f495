//! Agent configuration.
//!
//! Configuration is an immutable value fixed at agent construction; no option
//! changes behavior after the agent is running.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default bound on the number of buffered records.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;
/// Default cadence of the periodic flush task.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);
/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors produced by [`AgentConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Immutable agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum number of buffered records before oldest-drop eviction.
    pub max_queue_size: usize,
    /// Cadence of the periodic flush task.
    pub flush_interval: Duration,
    /// Timeout applied to each batch HTTP request.
    pub http_timeout: Duration,
    /// Whether records are echoed to the console (active in debug builds only).
    pub print_to_console: bool,
    /// Directory holding the durable pending-record database.
    pub storage_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            print_to_console: true,
            storage_dir: std::env::temp_dir().join("logship"),
        }
    }
}

impl AgentConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_queue_size must be greater than 0".to_string(),
            ));
        }

        if self.flush_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "flush_interval must be greater than 0".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "http_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
