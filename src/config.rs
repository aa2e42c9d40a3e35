//! Configuration module for feedbeat.

use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::{FeedbeatError, Result};

/// Heartbeat interval used when the configured value is absent or invalid.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 15;

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7878
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/feedbeat.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Poll cycle configuration.
///
/// The interval is kept as a string because it is edited through the same
/// string-valued settings surface as everything else; [`interval_minutes`]
/// does the validation.
///
/// [`interval_minutes`]: HeartbeatConfig::interval_minutes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartbeatConfig {
    /// Poll interval in minutes. Empty means the default of 15.
    #[serde(default)]
    pub interval: String,
    /// Include item descriptions in notification bodies.
    #[serde(default)]
    pub show_description: bool,
}

impl HeartbeatConfig {
    /// Resolve the poll interval in minutes.
    ///
    /// An empty value resolves to [`DEFAULT_INTERVAL_MINUTES`]. A value that
    /// is non-numeric or zero is an error; callers are expected to log it and
    /// fall back to the default themselves.
    pub fn interval_minutes(&self) -> Result<u64> {
        let raw = self.interval.trim();
        if raw.is_empty() {
            return Ok(DEFAULT_INTERVAL_MINUTES);
        }
        let minutes: u64 = raw.parse().map_err(|_| {
            FeedbeatError::Config(format!("invalid heartbeat interval '{}'", raw))
        })?;
        if minutes == 0 {
            return Err(FeedbeatError::Config(
                "heartbeat interval must be positive".to_string(),
            ));
        }
        Ok(minutes)
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Base URL of the message API notifications are posted to.
    #[serde(default = "default_notify_base_url")]
    pub base_url: String,
}

fn default_notify_base_url() -> String {
    "http://127.0.0.1:8065".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_notify_base_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/feedbeat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Web server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Poll cycle settings.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    /// Notification sink settings.
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| FeedbeatError::Config(e.to_string()))
    }
}

/// Process-wide holder for the heartbeat configuration.
///
/// The sync engine takes a snapshot once per cycle while a management
/// interface may replace the value concurrently, so access goes through a
/// readers-writer lock.
#[derive(Clone)]
pub struct SharedHeartbeat {
    inner: Arc<RwLock<HeartbeatConfig>>,
}

impl SharedHeartbeat {
    /// Create a new holder with the given initial configuration.
    pub fn new(config: HeartbeatConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Clone out the current configuration.
    pub fn snapshot(&self) -> HeartbeatConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the configuration (exclusive write).
    pub fn replace(&self, config: HeartbeatConfig) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.database.path, "data/feedbeat.db");
        assert_eq!(config.heartbeat.interval, "");
        assert!(!config.heartbeat.show_description);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_interval_minutes_empty_is_default() {
        let heartbeat = HeartbeatConfig::default();
        assert_eq!(
            heartbeat.interval_minutes().unwrap(),
            DEFAULT_INTERVAL_MINUTES
        );
    }

    #[test]
    fn test_interval_minutes_numeric() {
        let heartbeat = HeartbeatConfig {
            interval: "30".to_string(),
            show_description: false,
        };
        assert_eq!(heartbeat.interval_minutes().unwrap(), 30);
    }

    #[test]
    fn test_interval_minutes_whitespace_trimmed() {
        let heartbeat = HeartbeatConfig {
            interval: " 5 ".to_string(),
            show_description: false,
        };
        assert_eq!(heartbeat.interval_minutes().unwrap(), 5);
    }

    #[test]
    fn test_interval_minutes_non_numeric_is_error() {
        let heartbeat = HeartbeatConfig {
            interval: "soon".to_string(),
            show_description: false,
        };
        let err = heartbeat.interval_minutes().unwrap_err();
        assert!(err.to_string().contains("invalid heartbeat interval"));
    }

    #[test]
    fn test_interval_minutes_zero_is_error() {
        let heartbeat = HeartbeatConfig {
            interval: "0".to_string(),
            show_description: false,
        };
        assert!(heartbeat.interval_minutes().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
[server]
port = 9000

[heartbeat]
interval = "20"
show_description = true
"#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.heartbeat.interval, "20");
        assert!(config.heartbeat.show_description);
        // Untouched sections keep their defaults
        assert_eq!(config.notify.base_url, "http://127.0.0.1:8065");
    }

    #[test]
    fn test_shared_heartbeat_snapshot_and_replace() {
        let shared = SharedHeartbeat::new(HeartbeatConfig::default());
        assert_eq!(shared.snapshot().interval, "");

        shared.replace(HeartbeatConfig {
            interval: "45".to_string(),
            show_description: true,
        });
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.interval, "45");
        assert!(snapshot.show_description);
    }
}
