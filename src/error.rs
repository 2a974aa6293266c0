//! Error types for PLCComS communication
//!
//! Per-variable failures ([`PlcError::Protocol`]) are contained by the caller;
//! everything that invalidates the connection ([`PlcError::is_connection_loss`])
//! tears it down before surfacing.

use thiserror::Error;

/// Result alias used throughout the crate
pub type PlcResult<T> = std::result::Result<T, PlcError>;

/// PLCComS error
#[derive(Error, Debug)]
pub enum PlcError {
    /// Connect or reconnect failed, or the peer closed the stream
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// A command (or the connect) exceeded its deadline
    #[error("Timeout: {command} did not complete within {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// Malformed response
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Socket-level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unloadable configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A poll cycle could not produce a result
    #[error("Update failed for {endpoint}: {source}")]
    UpdateFailed {
        endpoint: String,
        #[source]
        source: Box<PlcError>,
    },
}

impl PlcError {
    pub fn connection(message: impl Into<String>) -> Self {
        PlcError::Connection {
            message: message.into(),
        }
    }

    pub fn timeout(command: impl Into<String>, timeout_ms: u64) -> Self {
        PlcError::Timeout {
            command: command.into(),
            timeout_ms,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        PlcError::Protocol {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        PlcError::Configuration {
            message: message.into(),
        }
    }

    pub fn update_failed(endpoint: impl Into<String>, source: PlcError) -> Self {
        PlcError::UpdateFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error left the connection unusable.
    pub fn is_connection_loss(&self) -> bool {
        match self {
            PlcError::Connection { .. } | PlcError::Timeout { .. } | PlcError::Io(_) => true,
            PlcError::UpdateFailed { source, .. } => source.is_connection_loss(),
            PlcError::Protocol { .. } | PlcError::Configuration { .. } => false,
        }
    }

    /// Whether this is a command or connect deadline miss.
    pub fn is_timeout(&self) -> bool {
        match self {
            PlcError::Timeout { .. } => true,
            PlcError::UpdateFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

impl From<figment::Error> for PlcError {
    fn from(err: figment::Error) -> Self {
        PlcError::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PlcError::timeout("GET:TEMP", 5000);
        assert_eq!(
            err.to_string(),
            "Timeout: GET:TEMP did not complete within 5000 ms"
        );

        let err = PlcError::update_failed("10.0.0.5:5010", PlcError::connection("refused"));
        assert_eq!(
            err.to_string(),
            "Update failed for 10.0.0.5:5010: Connection error: refused"
        );
    }

    #[test]
    fn test_connection_loss_classification() {
        assert!(PlcError::connection("refused").is_connection_loss());
        assert!(PlcError::timeout("LIST:", 10).is_connection_loss());
        assert!(PlcError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            .is_connection_loss());
        assert!(!PlcError::protocol("bad line").is_connection_loss());
        assert!(!PlcError::configuration("port").is_connection_loss());

        let wrapped = PlcError::update_failed("plc:5010", PlcError::timeout("LIST:", 10));
        assert!(wrapped.is_connection_loss());
        assert!(wrapped.is_timeout());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err = PlcError::update_failed("plc:5010", PlcError::protocol("junk"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Protocol error: junk"));
    }
}
