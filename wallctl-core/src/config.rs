//! Configuration for wallctl
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. `~/.wallctl/config.toml` (or an explicit path)
//! 3. Environment variables (`WALLCTL_*`)
//! 4. CLI flags (applied by wallctl-cli)

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variable names recognised by [`WallctlConfig::apply_env`]
pub const ENV_BIND: &str = "WALLCTL_BIND";
pub const ENV_DATABASE_PATH: &str = "WALLCTL_DATABASE_PATH";
pub const ENV_UPLOAD_DIR: &str = "WALLCTL_UPLOAD_DIR";
pub const ENV_ADMIN_PASSWORD: &str = "WALLCTL_ADMIN_PASSWORD";

const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallctlConfig {
    /// HTTP bind address
    pub bind: SocketAddr,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Root of uploaded files; images live under `<upload_dir>/permanent`
    pub upload_dir: PathBuf,
    /// Lifetime of a login session
    pub session_ttl_hours: u64,
    /// Maximum accepted request body for uploads
    pub max_upload_bytes: usize,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Password for the `admin` account created on first start
    pub bootstrap_admin_password: String,
}

impl Default for WallctlConfig {
    fn default() -> Self {
        let home = Self::home_dir();
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_path: home.join("wallctl.db"),
            upload_dir: home.join("uploads"),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            bootstrap_admin_password: "admin123".to_string(),
        }
    }
}

impl WallctlConfig {
    /// Base directory: ~/.wallctl
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wallctl")
    }

    /// Default config file path: ~/.wallctl/config.toml
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load config from `path` (or the default location), then apply
    /// environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Read a config file without looking at the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `WALLCTL_*` overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind
                .parse()
                .map_err(|_| CoreError::config(format!("{ENV_BIND} is not a socket address: {bind}")))?;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_UPLOAD_DIR) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            if password.is_empty() {
                return Err(CoreError::config(format!("{ENV_ADMIN_PASSWORD} cannot be empty")));
            }
            self.bootstrap_admin_password = password;
        }
        Ok(())
    }

    /// Session lifetime in seconds.
    pub fn session_ttl_secs(&self) -> i64 {
        i64::try_from(self.session_ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX)
    }

    /// Render as TOML (used by `wallctl config show`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WallctlConfig::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, WallctlConfig::default());
        assert_eq!(config.bind.port(), 5000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "bind = \"0.0.0.0:8080\"\nsession_ttl_hours = 2\n").unwrap();

        let config = WallctlConfig::from_file(&path).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.session_ttl_secs(), 7200);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "bind = [").unwrap();

        let err = WallctlConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_BIND, "127.0.0.1:9999"),
            (ENV_UPLOAD_DIR, "/srv/walls"),
            (ENV_ADMIN_PASSWORD, "s3cret"),
        ]);
        let mut config = WallctlConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind.port(), 9999);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/walls"));
        assert_eq!(config.bootstrap_admin_password, "s3cret");
    }

    #[test]
    fn bad_bind_override_is_an_error() {
        let mut config = WallctlConfig::default();
        let err = config
            .apply_env(|k| (k == ENV_BIND).then(|| "not-an-addr".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BIND));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = WallctlConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: WallctlConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
