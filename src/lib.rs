//! # plccoms - Tecomat Foxtrot PLCComS client and poller
//!
//! **Author:** Evan Liu <liuyifanz.1996@gmail.com>
//! **Version:** 0.3.0
//! **License:** MIT
//!
//! An async client for the PLCComS text protocol spoken by Tecomat Foxtrot
//! PLCs, plus a polling pipeline that discovers variables, filters them,
//! reads them one by one, coerces the raw text into typed values and
//! publishes the result of every cycle.
//!
//! ## Features
//!
//! - **Single serialized connection**: one TCP stream per endpoint, every
//!   exchange behind an async mutex, timeouts force a reconnect
//! - **Typed values**: `true`/`false`, integers, floats and strings
//! - **Include/exclude filtering**: case-insensitive substring patterns
//! - **Polling**: fixed interval, non-overlapping cycles, result diffing,
//!   watch-channel publishing
//! - **Diagnostics**: firmware and server versions, connected clients,
//!   active variable count
//!
//! ## Supported Commands
//!
//! | Command | Reply | Client |
//! |---------|-------|--------|
//! | `LIST:` | `name,type` lines framed by `LIST:` | ✅ |
//! | `GET:<name>` | `<name>,<value>` | ✅ |
//! | `SET:<name>,<value>` | ignored | ✅ |
//! | `GETINFO:` | key/value lines framed by `GETINFO:` | ✅ |
//! | `EN:` | `EN:<count>` | ✅ |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plccoms::{PlcComsClient, PlcResult, PlcValue};
//!
//! #[tokio::main]
//! async fn main() -> PlcResult<()> {
//!     let client = PlcComsClient::tcp("192.168.1.10", 5010);
//!
//!     let names = client.list_variables().await?;
//!     for (name, raw) in client.get_variables(&names).await? {
//!         println!("{} = {}", name, PlcValue::parse(&raw));
//!     }
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Protocol
// ============================================================================

/// Core error types and result handling
pub mod error;

/// PLCComS command keywords and defaults
pub mod constants;

/// Command encoding, line framing and reply parsing
pub mod codec;

/// Stream transports
pub mod transport;

/// PLCComS client
pub mod client;

/// Typed PLC values
pub mod value;

// ============================================================================
// Polling pipeline
// ============================================================================

/// Variable include/exclude filtering
pub mod filter;

/// `GETINFO:`/`EN:` diagnostics
pub mod diagnostics;

/// Poll cycle scheduling and publishing
pub mod coordinator;

/// Sensor classification of polled variables
pub mod sensor;

/// Endpoint configuration
pub mod config;

/// Log level configuration
pub mod logging;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use plccoms::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::{ClientOptions, ClientStats, GenericPlcClient, PlcComsClient};
pub use transport::{PlcTransport, TcpTransport};

// === Error handling ===
pub use error::{PlcError, PlcResult};

// === Core types ===
pub use codec::PlcCommand;
pub use value::PlcValue;

// === Polling ===
pub use config::PlcConfig;
pub use coordinator::{CycleState, PollCoordinator, PollDiff, PollOptions, PollResult};
pub use diagnostics::DiagnosticsSnapshot;
pub use filter::VariableFilter;
pub use sensor::{classify, DeviceClass, SensorDescription, SensorKind, StateClass};

// === Logging ===
pub use logging::LogLevel;

pub use constants::DEFAULT_PORT;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!("plccoms v{} - Tecomat Foxtrot PLCComS client", VERSION)
}
