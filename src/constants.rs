//! PLCComS protocol constants
//!
//! The PLCComS server speaks a line-oriented text protocol. Every command is a
//! keyword terminated by a colon, optionally followed by arguments, and every
//! line ends with `\n` (the server may send `\r\n`).

// ============================================================================
// Commands
// ============================================================================

/// Enumerate published variables. The reply is framed by the echoed keyword.
pub const CMD_LIST: &str = "LIST:";

/// Read one variable: `GET:<name>` → `<name>,<value>`.
pub const CMD_GET: &str = "GET:";

/// Write one variable: `SET:<name>,<value>`.
pub const CMD_SET: &str = "SET:";

/// Server and PLC information, multi-line.
pub const CMD_GETINFO: &str = "GETINFO:";

/// Number of variables enabled for the current client: `EN:` → `...:<count>`.
pub const CMD_ENABLED_COUNT: &str = "EN:";

/// Line terminator appended to outgoing commands
pub const LINE_TERMINATOR: &str = "\n";

/// Separator between a variable name and its value or metadata
pub const FIELD_SEPARATOR: char = ',';

// ============================================================================
// Defaults
// ============================================================================

/// Default PLCComS TCP port
pub const DEFAULT_PORT: u16 = 5010;

/// Default connect timeout (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default per-command timeout (5 seconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for each line of a framed multi-line reply
pub const DEFAULT_LIST_LINE_TIMEOUT_MS: u64 = 5_000;

/// Default poll interval in seconds
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;

/// Longest accepted poll interval (one day)
pub const MAX_SCAN_INTERVAL_SECS: u64 = 86_400;

/// Upper bound for a single response line. Longer lines are a protocol error.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial capacity of the per-connection read buffer
pub const READ_BUFFER_CAPACITY: usize = 4 * 1024;

// ============================================================================
// Value sentinels
// ============================================================================

/// Firmware "no data" rendering of a real variable. Suppressed literally.
pub const NO_DATA_SENTINEL: &str = "0.000000";

// ============================================================================
// Diagnostics keys
// ============================================================================

/// PLC firmware version
pub const DIAGNOSTIC_PLC_VERSION: &str = "plc_version";

/// PLCComS server version
pub const DIAGNOSTIC_SERVER_VERSION: &str = "server_version";

/// EPSNET network stack version
pub const DIAGNOSTIC_EPSNET_VERSION: &str = "epsnet_version";

/// Clients currently connected to the server
pub const DIAGNOSTIC_CONNECTED_CLIENTS: &str = "connected_clients";

/// Number of variables enabled for this client
pub const DIAGNOSTIC_ACTIVE_VARIABLES: &str = "active_variables";
