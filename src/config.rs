//! Construction-time configuration
//!
//! Missing or nonsensical fields fail client construction immediately
//! instead of surfacing later as cache or descriptor errors.

use std::path::PathBuf;
use thiserror::Error;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cached_modules";

/// Default TTL in seconds (one day).
pub const DEFAULT_CACHE_EXPIRATION_SECS: u64 = 86_400;

/// Errors raised by configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The cache path must not be empty")]
    EmptyCachePath,

    #[error("The cache expiration must be greater than zero")]
    ZeroExpiration,

    #[error("The package descriptor path must not be empty")]
    EmptyPackageJson,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache root directory, created if absent
    pub cache_path: PathBuf,

    /// TTL in seconds, added to the manifest expiration on every save
    pub cache_expiration_secs: u64,

    /// Local package descriptor used during dependency reconciliation
    pub package_json: PathBuf,

    /// Disable all reporter output
    pub suppress_messages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_expiration_secs: DEFAULT_CACHE_EXPIRATION_SECS,
            package_json: PathBuf::from("package.json"),
            suppress_messages: false,
        }
    }
}

impl Config {
    /// Validate required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyCachePath);
        }

        if self.cache_expiration_secs == 0 {
            return Err(ConfigError::ZeroExpiration);
        }

        if self.package_json.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPackageJson);
        }

        Ok(())
    }
}
