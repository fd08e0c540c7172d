//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Platform service endpoints.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Event alerting settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Endpoint lists for the platform services this server calls out to.
/// One endpoint is selected at random per call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfig {
    /// Device registry endpoints.
    #[serde(default)]
    pub device_registry: Vec<String>,

    /// Notification provider endpoints.
    #[serde(default)]
    pub notification: Vec<String>,
}

/// Event alerting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Minimum event level that triggers a push notification.
    #[serde(default = "default_push_level")]
    pub push_level: i64,

    /// Title carried by every push notification.
    #[serde(default = "default_push_title")]
    pub push_title: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "beacon_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "beacon.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_push_level() -> i64 {
    3
}

fn default_push_title() -> String {
    "Beacon".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            push_level: default_push_level(),
            push_title: default_push_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `BEACON_HOST` overrides `server.host`
/// - `BEACON_PORT` overrides `server.port`
/// - `BEACON_DB_PATH` overrides `database.path`
/// - `BEACON_PUSH_LEVEL` overrides `events.push_level`
/// - `BEACON_LOG_LEVEL` overrides `logging.level`
/// - `BEACON_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("BEACON_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("BEACON_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("BEACON_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(level) = std::env::var("BEACON_PUSH_LEVEL") {
        if let Ok(parsed) = level.parse() {
            config.events.push_level = parsed;
        }
    }
    if let Ok(level) = std::env::var("BEACON_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("BEACON_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "beacon.db");
        assert_eq!(config.events.push_level, 3);
        assert_eq!(config.events.push_title, "Beacon");
        assert!(config.services.device_registry.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            path = "/var/lib/beacon/events.db"
            pool_max_size = 4

            [services]
            device_registry = ["http://registry-1:9000", "http://registry-2:9000"]
            notification = ["http://push:9100"]

            [events]
            push_level = 4
            push_title = "M-Cloud"

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.pool_max_size, 4);
        assert_eq!(config.services.device_registry.len(), 2);
        assert_eq!(config.events.push_level, 4);
        assert_eq!(config.events.push_title, "M-Cloud");
        assert!(config.logging.json);
    }
}
