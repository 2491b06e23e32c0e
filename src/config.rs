//! Configuration for the listener and connector binaries.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for the one-shot listener
#[derive(Parser, Debug)]
#[command(name = "oneshot-listener")]
#[command(version = "0.1.0")]
#[command(about = "Accept one TCP connection, answer one request, exit", long_about = None)]
pub struct ListenerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g. 0.0.0.0 or 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Send an RST instead of an orderly close when dropping the accepted connection
    #[arg(long)]
    pub reset: bool,

    /// Millisecond-stamped diagnostic logging
    #[arg(short, long)]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Command-line arguments for the one-shot connector
#[derive(Parser, Debug)]
#[command(name = "oneshot-connector")]
#[command(version = "0.1.0")]
#[command(about = "Send one TCP request, wait for one reply, exit", long_about = None)]
pub struct ConnectorArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to connect to (e.g. 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to connect to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds to wait for the reply before giving up
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Millisecond-stamped diagnostic logging
    #[arg(short, long)]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub listener: ListenerSection,
    #[serde(default)]
    pub connector: ConnectorSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Listener-related configuration
#[derive(Debug, Deserialize)]
pub struct ListenerSection {
    /// Address to bind to
    #[serde(default = "default_bind_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Reset (linger-0) instead of orderly close
    #[serde(default)]
    pub reset: bool,
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_port(),
            reset: false,
        }
    }
}

/// Connector-related configuration
#[derive(Debug, Deserialize)]
pub struct ConnectorSection {
    /// Address to connect to
    #[serde(default = "default_connect_host")]
    pub host: String,
    /// Port to connect to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds to wait for the reply
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

impl Default for ConnectorSection {
    fn default() -> Self {
        Self {
            host: default_connect_host(),
            port: default_port(),
            timeout: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_connect_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved listener configuration
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
    pub reset: bool,
    pub debug: bool,
    pub log_level: String,
}

impl ListenerConfig {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(ListenerArgs::parse())
    }

    pub fn from_args(args: ListenerArgs) -> Result<Self, ConfigError> {
        let toml_config = read_toml(args.config.as_ref())?;

        Ok(ListenerConfig {
            host: args.host.unwrap_or(toml_config.listener.host),
            port: args.port.unwrap_or(toml_config.listener.port),
            reset: args.reset || toml_config.listener.reset,
            debug: args.debug,
            log_level: if args.log_level != "info" {
                args.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Final resolved connector configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub debug: bool,
    pub log_level: String,
}

impl ConnectorConfig {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(ConnectorArgs::parse())
    }

    pub fn from_args(args: ConnectorArgs) -> Result<Self, ConfigError> {
        let toml_config = read_toml(args.config.as_ref())?;

        Ok(ConnectorConfig {
            host: args.host.unwrap_or(toml_config.connector.host),
            port: args.port.unwrap_or(toml_config.connector.port),
            timeout_secs: args.timeout.unwrap_or(toml_config.connector.timeout),
            debug: args.debug,
            log_level: if args.log_level != "info" {
                args.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

fn read_toml(path: Option<&PathBuf>) -> Result<TomlConfig, ConfigError> {
    match path {
        Some(config_path) => {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))
        }
        None => Ok(TomlConfig::default()),
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, 8080);
        assert!(!config.listener.reset);
        assert_eq!(config.connector.host, "127.0.0.1");
        assert_eq!(config.connector.timeout, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [listener]
            host = "127.0.0.1"
            port = 8082
            reset = true

            [connector]
            host = "127.0.0.1"
            port = 8082
            timeout = 2

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.port, 8082);
        assert!(config.listener.reset);
        assert_eq!(config.connector.port, 8082);
        assert_eq!(config.connector.timeout, 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_toml_defaults() {
        let args = ListenerArgs {
            config: None,
            host: Some("127.0.0.1".to_string()),
            port: Some(8082),
            reset: true,
            debug: true,
            log_level: "info".to_string(),
        };

        let config = ListenerConfig::from_args(args).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8082);
        assert!(config.reset);
        assert!(config.debug);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = ConnectorArgs {
            config: Some(PathBuf::from("/nonexistent/oneshot.toml")),
            host: None,
            port: None,
            timeout: None,
            debug: false,
            log_level: "info".to_string(),
        };

        match ConnectorConfig::from_args(args) {
            Err(ConfigError::FileRead(_, _)) => {}
            other => panic!("unexpected: {:?}", other.map(|c| c.host)),
        }
    }
}
