//! Node configuration.
//!
//! Values are layered: built-in defaults, then an optional config file
//! (YAML, TOML or JSON by extension), then `HERALD_*` environment variables.
//! Command-line flags are applied on top by the binary.

use crate::observability::LogFormat;
use herald_realtime::{
    HubConfig, SessionConfig, DEFAULT_NOTIFIER_CAPACITY, DEFAULT_OUTBOUND_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `HERALD_PORT=9000`.
pub const ENV_PREFIX: &str = "HERALD";

/// Configuration for the Herald node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (pretty, json).
    pub log_format: String,
    /// Messages buffered per client before further ones are dropped.
    pub outbound_capacity: usize,
    /// Bound on a single WebSocket write, in milliseconds.
    pub write_timeout_ms: u64,
    /// Change notifications waiting for dispatch.
    pub notifier_capacity: usize,
    /// Maximum live WebSocket clients; 0 means unbounded.
    pub max_connections: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            write_timeout_ms: 10_000,
            notifier_capacity: DEFAULT_NOTIFIER_CAPACITY,
            max_connections: 0,
        }
    }
}

impl NodeConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Whether logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        LogFormat::parse(&self.log_format) == LogFormat::Json
    }

    /// Hub settings derived from this configuration.
    pub fn hub(&self) -> HubConfig {
        HubConfig {
            max_connections: (self.max_connections > 0).then_some(self.max_connections),
        }
    }

    /// Session settings derived from this configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            outbound_capacity: self.outbound_capacity,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}
