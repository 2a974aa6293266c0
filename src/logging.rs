//! Log level configuration
//!
//! The library only emits `tracing` events. Which of them are shown is
//! decided by the subscriber the application installs; [`LogLevel`] is the
//! configuration value that feeds it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::PlcError;

/// Configured verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    /// Filter directive for this crate, e.g. `plccoms=debug`.
    ///
    /// With `detailed` set the crate logs one level more verbose than
    /// configured, down to `trace` for wire traffic.
    pub fn directive(self, detailed: bool) -> String {
        let level = match (self, detailed) {
            (LogLevel::Debug, true) => "trace",
            (LogLevel::Debug, false) | (LogLevel::Info, true) => "debug",
            (LogLevel::Info, false) | (LogLevel::Warning, true) => "info",
            (LogLevel::Warning, false) | (LogLevel::Error, true) => "warn",
            (LogLevel::Error, false) => "error",
        };
        format!("{}={}", env!("CARGO_PKG_NAME"), level)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = PlcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(PlcError::configuration(format!(
                "unknown log level {:?} (expected debug, info, warning or error)",
                other
            ))),
        }
    }
}
