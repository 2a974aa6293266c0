//! Configuration
//!
//! [`PlcConfig`] is the full option set of one PLC endpoint. It deserializes
//! from TOML (and environment variables prefixed with `PLCCOMS_`) through
//! figment; every field except `host` has a default.
//!
//! ```toml
//! host = "192.168.1.10"
//! port = 5010
//! scan_interval = 30
//! variable_prefixes = "TEPLOTY, SVETLA"
//! exclude_variable_prefixes = "TEST"
//! ignore_zero_values = true
//! log_level = "info"
//! detailed_logging = false
//! ```

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::client::ClientOptions;
use crate::constants::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LIST_LINE_TIMEOUT_MS,
    DEFAULT_PORT, DEFAULT_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS,
};
use crate::coordinator::PollOptions;
use crate::error::{PlcError, PlcResult};
use crate::filter::VariableFilter;
use crate::logging::LogLevel;
use crate::transport::TcpTransport;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "PLCCOMS_";

/// Options of one PLC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlcConfig {
    #[serde(alias = "plc_ip")]
    pub host: String,

    #[serde(default = "default_port", alias = "plc_port")]
    pub port: u16,

    /// Poll interval in seconds
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Include patterns, comma separated
    #[serde(default)]
    pub variable_prefixes: String,

    /// Exclude patterns, comma separated
    #[serde(default)]
    pub exclude_variable_prefixes: String,

    #[serde(default = "default_true")]
    pub ignore_zero_values: bool,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub detailed_logging: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,

    #[serde(default = "default_list_line_timeout")]
    pub list_line_timeout_ms: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_command_timeout() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

fn default_list_line_timeout() -> u64 {
    DEFAULT_LIST_LINE_TIMEOUT_MS
}

impl PlcConfig {
    /// Defaults for everything but the host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
            variable_prefixes: String::new(),
            exclude_variable_prefixes: String::new(),
            ignore_zero_values: true,
            log_level: LogLevel::default(),
            detailed_logging: false,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            list_line_timeout_ms: DEFAULT_LIST_LINE_TIMEOUT_MS,
        }
    }

    /// Load from a TOML file, then apply `PLCCOMS_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> PlcResult<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Load from environment variables only.
    pub fn from_env() -> PlcResult<Self> {
        Self::from_figment(Figment::new().merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate.
    pub fn from_figment(figment: Figment) -> PlcResult<Self> {
        let config: PlcConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlcResult<()> {
        if self.host.trim().is_empty() {
            return Err(PlcError::configuration("host must not be empty"));
        }
        if self.port == 0 {
            return Err(PlcError::configuration("port must be in 1..=65535"));
        }
        if !(1..=MAX_SCAN_INTERVAL_SECS).contains(&self.scan_interval) {
            return Err(PlcError::configuration(format!(
                "scan_interval must be in 1..={} seconds",
                MAX_SCAN_INTERVAL_SECS
            )));
        }
        for (name, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("list_line_timeout_ms", self.list_line_timeout_ms),
        ] {
            if value == 0 {
                return Err(PlcError::configuration(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn filter(&self) -> VariableFilter {
        VariableFilter::from_config(&self.variable_prefixes, &self.exclude_variable_prefixes)
    }

    pub fn transport(&self) -> TcpTransport {
        TcpTransport::new(self.host.clone(), self.port)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new()
            .with_command_timeout(Duration::from_millis(self.command_timeout_ms))
            .with_list_line_timeout(Duration::from_millis(self.list_line_timeout_ms))
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::new(self.filter())
            .with_scan_interval(self.scan_interval())
            .with_ignore_zero(self.ignore_zero_values)
            .with_detailed_logging(self.detailed_logging)
    }
}
