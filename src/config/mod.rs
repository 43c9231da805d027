//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `KEYCACHE_*` environment variables.
//!
//! ```toml
//! [dedupe]
//! max_key_length = 64
//! unsorted_capacity = 1000
//! default_strategy = "unsorted"
//!
//! [logging]
//! format = "json"
//! filter = "keycache=debug"
//! file = "/var/log/keycache.log"
//! ```

use crate::models::Strategy;
use crate::services::DedupeConfig;
use crate::{DedupeError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for keycache.
#[derive(Debug, Clone, Default)]
pub struct KeycacheConfig {
    /// Deduplication bounds and default strategy.
    pub dedupe: DedupeConfig,
    /// Logging settings, resolved by the observability layer.
    pub logging: LoggingSettings,
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `tracing` filter directive, e.g. `keycache=debug`.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Deduplication section.
    pub dedupe: Option<ConfigFileDedupe>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Dedupe section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileDedupe {
    /// Longest accepted string key.
    pub max_key_length: Option<usize>,
    /// Capacity of the unsorted key cache.
    pub unsorted_capacity: Option<usize>,
    /// Strategy used when a call does not name one.
    pub default_strategy: Option<String>,
}

impl KeycacheConfig {
    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::OperationFailed`] if the file cannot be read or
    /// parsed, and [`DedupeError::InvalidStrategy`] if it names an unknown
    /// default strategy.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DedupeError::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Same as [`KeycacheConfig::load_from_file`], minus the I/O failure.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| DedupeError::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/keycache/` on macOS)
    /// 2. XDG config dir (`~/.config/keycache/` for Unix compatibility)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("keycache").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("keycache")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Loads configuration from `path` if given, else from the default
    /// location, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicit `path` cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `KEYCACHE_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.dedupe = self.dedupe.with_env_overrides();
        if let Ok(format) = std::env::var("KEYCACHE_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Ok(file) = std::env::var("KEYCACHE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        self
    }

    /// Converts a `ConfigFile` to `KeycacheConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dedupe) = file.dedupe {
            if let Some(length) = dedupe.max_key_length {
                config.dedupe.max_key_length = length;
            }
            if let Some(capacity) = dedupe.unsorted_capacity {
                config.dedupe.unsorted_capacity = capacity;
            }
            if let Some(strategy) = dedupe.default_strategy {
                config.dedupe.default_strategy = strategy.parse::<Strategy>()?;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }
}
