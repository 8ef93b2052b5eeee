//! Configuration management for hashledger
//!
//! Values come from `config.toml` when present, fall back to defaults
//! otherwise, and the `PORT` environment variable overrides the listen port.

use serde::Deserialize;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::error::ChainError;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_PORT: u16 = 8080;
pub const PORT_ENV_VAR: &str = "PORT";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Parse a TOML document, then validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ChainError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the port from a raw value such as the `PORT` variable.
    /// `None` or an empty string leaves the configured port in place.
    pub fn with_port_override(mut self, raw: Option<&str>) -> Result<Self, ChainError> {
        if let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) {
            self.server.port = raw
                .parse::<u16>()
                .map_err(|e| ChainError::Config(format!("invalid port {:?}: {}", raw, e)))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.server.host.trim().is_empty() {
            return Err(ChainError::Config("server.host must not be empty".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ChainError::Config(
                "server.request_timeout_secs must be greater than 0".into(),
            ));
        }
        self.socket_addrs()?;
        self.log_level()?;
        Ok(())
    }

    /// Resolve `server.host` and `server.port` to listen addresses.
    ///
    /// Accepts host names such as `localhost` as well as bare IPv4 and IPv6
    /// literals (`::`), the same forms the listener binds to.
    pub fn socket_addrs(&self) -> Result<Vec<SocketAddr>, ChainError> {
        let host = self.server.host.as_str();
        let addrs: Vec<SocketAddr> = (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| ChainError::Config(format!("invalid listen address {:?}: {}", host, e)))?
            .collect();
        if addrs.is_empty() {
            return Err(ChainError::Config(format!(
                "listen address {:?} resolved to nothing",
                host
            )));
        }
        Ok(addrs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn log_level(&self) -> Result<tracing::Level, ChainError> {
        self.logging
            .level
            .parse()
            .map_err(|_| ChainError::Config(format!("unknown log level {:?}", self.logging.level)))
    }
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)?;
    Config::from_toml_str(&config_str)
}
