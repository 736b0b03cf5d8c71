//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_SECS;
use crate::error::{CacheError, Result};
use crate::repository::DEFAULT_EXTENSION;

/// Storage backend selected for the server pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Items held in process memory
    Memory,
    /// One file per item under `cache_dir`
    File,
    /// A process-wide session dictionary
    Session,
}

impl FromStr for StorageKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            "session" => Ok(StorageKind::Session),
            other => Err(CacheError::InvalidArgument(format!(
                "STORAGE must be memory, file or session, got '{}'",
                other
            ))),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for items without explicit TTL, None = unbounded
    pub default_ttl: Option<i64>,
    /// HTTP server port
    pub server_port: u16,
    /// Background commit task interval in seconds, never 0
    pub commit_interval: u64,
    /// Storage backend
    pub storage: StorageKind,
    /// Directory used by the file backend
    pub cache_dir: PathBuf,
    /// File extension used by the file backend
    pub cache_extension: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds, or `none` (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `COMMIT_INTERVAL` - Deferred flush frequency in seconds, at least 1 (default: 5)
    /// - `STORAGE` - `memory`, `file` or `session` (default: memory)
    /// - `CACHE_DIR` - File backend directory (default: `<tmp>/cache_pool`)
    /// - `CACHE_EXTENSION` - File backend extension (default: cache)
    ///
    /// # Errors
    /// `InvalidArgument` naming the variable that could not be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_ttl = match env::var("DEFAULT_TTL") {
            Ok(v) if v.trim().eq_ignore_ascii_case("none") => None,
            Ok(v) => Some(parse_var("DEFAULT_TTL", &v)?),
            Err(_) => defaults.default_ttl,
        };

        let commit_interval = parse_env("COMMIT_INTERVAL")?.unwrap_or(defaults.commit_interval);
        if commit_interval == 0 {
            return Err(CacheError::InvalidArgument(
                "COMMIT_INTERVAL must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            default_ttl,
            server_port: parse_env("SERVER_PORT")?.unwrap_or(defaults.server_port),
            commit_interval,
            storage: parse_env("STORAGE")?.unwrap_or(defaults.storage),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_extension: env::var("CACHE_EXTENSION").unwrap_or(defaults.cache_extension),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Some(DEFAULT_TTL_SECS),
            server_port: 3000,
            commit_interval: 5,
            storage: StorageKind::Memory,
            cache_dir: env::temp_dir().join("cache_pool"),
            cache_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Parses an environment variable if it is set.
fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => parse_var(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CacheError::InvalidArgument(format!("{} has an invalid value '{}'", name, value))
    })
}
