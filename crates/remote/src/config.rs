//! Remote configuration via `restore.toml`
//!
//! The endpoint is an explicit value handed to the action wrapper rather
//! than module-level state. Without an endpoint the wrapper runs in
//! local-only mode and never starts a flush.

use crate::error::RemoteError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "restore.toml";

/// Remote store configuration loaded from `restore.toml`.
///
/// # Example
///
/// ```toml
/// endpoint = "http://localhost:3001/data"
/// timeout_ms = 5000
/// queue_depth = 64
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// URL serving `GET` (initial load) and `POST` (operation batches)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum number of batches waiting for the flush worker (default: 64)
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_queue_depth() -> usize {
    64
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl RemoteConfig {
    /// Config pointing at an endpoint, other settings default
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check the settings for values the queue and client cannot use
    pub fn validate(&self) -> Result<(), RemoteError> {
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(RemoteError::Config(format!(
                    "endpoint '{}' must start with http:// or https://",
                    endpoint
                )));
            }
        }
        if self.queue_depth == 0 {
            return Err(RemoteError::Config("queue_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# restore remote store configuration
#
# Endpoint serving GET (initial dataset) and POST (operation batches).
# Leave unset to keep all changes local.
# endpoint = "http://localhost:3001/data"

# Request timeout in milliseconds (default: 5000)
timeout_ms = 5000

# Batches allowed to wait for the flush worker before new ones are
# reported as failed (default: 64)
queue_depth = 64
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, RemoteError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RemoteError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RemoteConfig = toml::from_str(&content).map_err(|e| {
            RemoteError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), RemoteError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                RemoteError::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    ///
    /// An existing file is replaced. Nothing is written if the config does
    /// not validate.
    pub fn write_to_file(&self, path: &Path) -> Result<(), RemoteError> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| RemoteError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            RemoteError::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
