/// Structured error types for wallctl-core.
///
/// Binary crates (wallctl-cli) wrap these with `anyhow`, the server crate
/// matches on them directly.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wallctl-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file exists but is not valid TOML for `WallctlConfig`
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value (file or environment) could not be interpreted
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for wallctl-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
