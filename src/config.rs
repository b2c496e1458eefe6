//! # Application Configuration
//!
//! [`AppConfig`] holds the runtime knobs of the service layer: the size and
//! TTL of the per-entity caches and the capacity of the change-notification
//! channel.
//!
//! ## Sources
//!
//! Values are resolved in this order, later sources winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML file named by `SCHOOL_CONFIG_PATH`, if set.
//! 3. Environment variables (a `.env` file is loaded first via `dotenvy`):
//!    `SCHOOL_CACHE_CAPACITY`, `SCHOOL_CACHE_TTL_SECS`, `SCHOOL_NOTIFY_CAPACITY`.
//!
//! ```toml
//! [cache]
//! capacity = 5000
//! ttl_secs = 600
//!
//! [notifications]
//! capacity = 1024
//! ```

use serde::Deserialize;
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "SCHOOL_CONFIG_PATH";
pub const CACHE_CAPACITY_VAR: &str = "SCHOOL_CACHE_CAPACITY";
pub const CACHE_TTL_VAR: &str = "SCHOOL_CACHE_TTL_SECS";
pub const NOTIFY_CAPACITY_VAR: &str = "SCHOOL_NOTIFY_CAPACITY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached models per cached entity type.
    pub capacity: u64,
    /// Entry lifetime in seconds; 0 keeps entries until evicted or invalidated.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Notifications buffered per subscriber before the oldest are dropped.
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Loads defaults, then the optional TOML file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut cfg = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::load_from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env(|name| std::env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides fields from variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CACHE_CAPACITY_VAR) {
            self.cache.capacity = parse_var(CACHE_CAPACITY_VAR, value)?;
        }
        if let Some(value) = lookup(CACHE_TTL_VAR) {
            self.cache.ttl_secs = parse_var(CACHE_TTL_VAR, value)?;
        }
        if let Some(value) = lookup(NOTIFY_CAPACITY_VAR) {
            self.notifications.capacity = parse_var(NOTIFY_CAPACITY_VAR, value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid("cache.capacity must be >= 1".into()));
        }
        if self.notifications.capacity == 0 {
            return Err(ConfigError::Invalid(
                "notifications.capacity must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { name, value })
}
