//! PLCComS protocol client
//!
//! One [`GenericPlcClient`] owns one connection to one PLCComS endpoint. All
//! exchanges go through an async mutex, so concurrent callers queue in arrival
//! order and never interleave partial writes or reads on the socket.
//!
//! # Connection lifecycle
//!
//! The connection is opened lazily by the first command (or explicitly with
//! [`GenericPlcClient::connect`]). Any timeout or I/O failure tears it down
//! before the error is returned, so the next command starts on a fresh
//! stream and a late reply can never be read as the answer to a different
//! command.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plccoms::{PlcComsClient, PlcResult};
//!
//! #[tokio::main]
//! async fn main() -> PlcResult<()> {
//!     let client = PlcComsClient::tcp("192.168.1.10", 5010);
//!
//!     let names = client.list_variables().await?;
//!     let values = client.get_variables(&names).await?;
//!     for (name, value) in &values {
//!         println!("{} = {}", name, value);
//!     }
//!
//!     client.set_variable("LIGHT_HALL", "1").await?;
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::codec::{
    is_frame_marker, parse_get_response, parse_list_line, LineBuffer, PlcCommand,
};
use crate::constants::{
    CMD_GET, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_LIST_LINE_TIMEOUT_MS, FIELD_SEPARATOR,
    READ_BUFFER_CAPACITY,
};
use crate::error::{PlcError, PlcResult};
use crate::transport::{PlcTransport, TcpTransport};

/// Client timing options.
///
/// # Example
///
/// ```rust
/// use plccoms::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new()
///     .with_command_timeout(Duration::from_secs(2))
///     .with_list_line_timeout(Duration::from_millis(500));
///
/// assert_eq!(options.command_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Deadline for one command: write plus the first reply line.
    pub command_timeout: Duration,
    /// Deadline for each further line of a framed reply (`LIST:`, `GETINFO:`).
    pub list_line_timeout: Duration,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the per-line timeout of framed replies.
    pub fn with_list_line_timeout(mut self, timeout: Duration) -> Self {
        self.list_line_timeout = timeout;
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            list_line_timeout: Duration::from_millis(DEFAULT_LIST_LINE_TIMEOUT_MS),
        }
    }
}

/// Exchange statistics of one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientStats {
    pub commands_sent: u64,
    pub responses_received: u64,
    pub timeouts: u64,
    pub connects: u64,
    pub disconnects: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    commands_sent: AtomicU64,
    responses_received: AtomicU64,
    timeouts: AtomicU64,
    connects: AtomicU64,
    disconnects: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ClientStats {
        ClientStats {
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
        }
    }
}

/// An open stream plus its read buffer.
///
/// `in_flight` is set before a command is written and cleared once its whole
/// reply has been read. Finding it set means an exchange was abandoned and
/// the rest of its reply may still arrive on this stream.
struct Connection<S> {
    stream: S,
    buffer: LineBuffer,
    in_flight: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: LineBuffer::with_capacity(READ_BUFFER_CAPACITY),
            in_flight: false,
        }
    }

    async fn read_line(&mut self) -> PlcResult<String> {
        loop {
            if let Some(line) = self.buffer.next_line()? {
                return Ok(line);
            }
            let n = self.stream.read_buf(self.buffer.bytes_mut()).await?;
            if n == 0 {
                return Err(PlcError::connection("connection closed by peer"));
            }
        }
    }

    /// Write `command` and read the first reply line. `in_flight` stays set;
    /// the caller clears it when the reply is complete.
    async fn round_trip(&mut self, command: &PlcCommand) -> PlcResult<String> {
        self.in_flight = true;
        self.stream.write_all(command.encode().as_bytes()).await?;
        self.stream.flush().await?;
        let line = self.read_line().await?;
        Ok(line.trim().to_string())
    }
}

/// PLCComS client over any [`PlcTransport`].
pub struct GenericPlcClient<T: PlcTransport> {
    transport: T,
    options: ClientOptions,
    connection: Mutex<Option<Connection<T::Stream>>>,
    connected: AtomicBool,
    stats: StatsCounters,
}

/// PLCComS client over TCP
pub type PlcComsClient = GenericPlcClient<TcpTransport>;

impl GenericPlcClient<TcpTransport> {
    /// TCP client with default timeouts. Does not connect yet.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(TcpTransport::new(host, port))
    }
}

impl<T: PlcTransport> GenericPlcClient<T> {
    /// Create a client with default options
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, ClientOptions::default())
    }

    /// Create a client with explicit timing options
    pub fn with_options(transport: T, options: ClientOptions) -> Self {
        Self {
            transport,
            options,
            connection: Mutex::new(None),
            connected: AtomicBool::new(false),
            stats: StatsCounters::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> ClientOptions {
        self.options
    }

    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    /// Whether a stream is currently open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.snapshot()
    }

    /// Open the connection if it is not open yet.
    pub async fn connect(&self) -> PlcResult<()> {
        let mut slot = self.connection.lock().await;
        self.ensure_connected(&mut slot).await.map(|_| ())
    }

    /// Close the connection. No-op when already disconnected.
    pub async fn disconnect(&self) {
        let mut slot = self.connection.lock().await;
        self.drop_connection(&mut slot, "disconnect requested");
    }

    /// Send one raw command line and return the trimmed reply line.
    pub async fn send_command(&self, command: &str) -> PlcResult<String> {
        let command = command.trim_end_matches(['\r', '\n']);
        if command.is_empty() || command.contains(['\r', '\n']) {
            return Err(PlcError::protocol(format!(
                "command must be a single non-empty line, got {:?}",
                command
            )));
        }
        self.execute(&PlcCommand::raw(command)).await
    }

    /// Send a typed command and return the trimmed reply line.
    pub async fn execute(&self, command: &PlcCommand) -> PlcResult<String> {
        let framed = matches!(command, PlcCommand::List | PlcCommand::GetInfo);
        let mut slot = self.connection.lock().await;
        self.exchange(&mut slot, command, framed).await
    }

    /// Enumerate the variables published by the server.
    ///
    /// A line timeout while the list is still being received truncates the
    /// list instead of failing it.
    pub async fn list_variables(&self) -> PlcResult<Vec<String>> {
        let lines = self.framed_exchange(&PlcCommand::List).await?;
        let names: Vec<String> = lines.iter().filter_map(|l| parse_list_line(l)).collect();
        debug!(endpoint = %self.endpoint(), count = names.len(), "Listed variables");
        Ok(names)
    }

    /// Read one variable, returning its raw value text.
    pub async fn get_variable(&self, name: &str) -> PlcResult<String> {
        validate_name(name)?;
        let response = self.execute(&PlcCommand::Get(name.to_string())).await?;
        let (echo, value) = parse_get_response(&response).map_err(|e| {
            PlcError::protocol(format!("GET:{} on {}: {}", name, self.endpoint(), e))
        })?;
        let echo = echo.trim();
        if echo.strip_prefix(CMD_GET).unwrap_or(echo) != name {
            return Err(PlcError::protocol(format!(
                "GET:{} on {} answered for {:?}",
                name,
                self.endpoint(),
                echo
            )));
        }
        Ok(value.to_string())
    }

    /// Read several variables, one `GET:` at a time.
    ///
    /// A malformed reply drops that variable with a warning and the batch
    /// continues. Connection failures and timeouts abort the batch.
    pub async fn get_variables<I, S>(&self, names: I) -> PlcResult<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            match self.get_variable(name).await {
                Ok(value) => {
                    results.insert(name.to_string(), value);
                }
                Err(err @ PlcError::Protocol { .. }) => {
                    warn!(endpoint = %self.endpoint(), variable = name, error = %err, "Dropping variable");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(results)
    }

    /// Write one variable. The reply is read and ignored.
    pub async fn set_variable(&self, name: &str, value: &str) -> PlcResult<()> {
        validate_name(name)?;
        if value.contains(['\r', '\n']) {
            return Err(PlcError::protocol(format!(
                "value for {} contains a line break",
                name
            )));
        }
        let reply = self
            .execute(&PlcCommand::Set {
                name: name.to_string(),
                value: value.to_string(),
            })
            .await?;
        debug!(endpoint = %self.endpoint(), variable = name, value, reply = %reply, "Variable set");
        Ok(())
    }

    /// Raw `GETINFO:` reply lines, without the framing echo.
    pub async fn get_info(&self) -> PlcResult<Vec<String>> {
        self.framed_exchange(&PlcCommand::GetInfo).await
    }

    /// Raw `EN:` reply line.
    pub async fn active_variable_count_raw(&self) -> PlcResult<String> {
        self.execute(&PlcCommand::EnabledCount).await
    }

    // ------------------------------------------------------------------
    // Internals, all called with the connection lock held
    // ------------------------------------------------------------------

    async fn ensure_connected<'a>(
        &self,
        slot: &'a mut Option<Connection<T::Stream>>,
    ) -> PlcResult<&'a mut Connection<T::Stream>> {
        if slot.as_ref().is_some_and(|conn| conn.in_flight) {
            warn!(endpoint = %self.endpoint(), "Previous exchange was abandoned, reconnecting");
            self.drop_connection(slot, "abandoned exchange");
        }
        if slot.is_none() {
            let stream = match self.transport.connect().await {
                Ok(stream) => stream,
                Err(err) => {
                    error!(endpoint = %self.endpoint(), error = %err, "Connect failed");
                    return Err(err);
                }
            };
            StatsCounters::bump(&self.stats.connects);
            self.connected.store(true, Ordering::Release);
            info!(endpoint = %self.endpoint(), "Connected to PLCComS server");
            *slot = Some(Connection::new(stream));
        }
        slot.as_mut()
            .ok_or_else(|| PlcError::connection(format!("{} is not connected", self.endpoint())))
    }

    fn drop_connection(&self, slot: &mut Option<Connection<T::Stream>>, reason: &str) {
        if slot.take().is_some() {
            StatsCounters::bump(&self.stats.disconnects);
            self.connected.store(false, Ordering::Release);
            debug!(endpoint = %self.endpoint(), reason, "Connection closed");
        }
    }

    /// With `framed` set the connection stays marked in flight after the
    /// first line; `framed_exchange` clears it at the closing marker.
    async fn exchange(
        &self,
        slot: &mut Option<Connection<T::Stream>>,
        command: &PlcCommand,
        framed: bool,
    ) -> PlcResult<String> {
        let conn = self.ensure_connected(slot).await?;

        if !conn.buffer.is_empty() {
            debug!(endpoint = %self.endpoint(), "Discarding unsolicited buffered data");
            conn.buffer.clear();
        }

        StatsCounters::bump(&self.stats.commands_sent);
        trace!(endpoint = %self.endpoint(), command = %command, "TX");

        let deadline = self.options.command_timeout;
        let outcome = match tokio::time::timeout(deadline, conn.round_trip(command)).await {
            Ok(result) => result,
            Err(_) => {
                StatsCounters::bump(&self.stats.timeouts);
                Err(PlcError::timeout(command.to_string(), deadline.as_millis() as u64))
            }
        };

        match outcome {
            Ok(response) => {
                if let Some(conn) = slot.as_mut() {
                    conn.in_flight = framed;
                }
                StatsCounters::bump(&self.stats.responses_received);
                trace!(endpoint = %self.endpoint(), response = %response, "RX");
                Ok(response)
            }
            Err(err) => {
                error!(endpoint = %self.endpoint(), command = %command, error = %err, "Command failed");
                self.drop_connection(slot, "command failed");
                Err(err)
            }
        }
    }

    /// Exchange whose reply is a list framed by the echoed keyword.
    ///
    /// The lock is held for the whole list so no other command can read a
    /// line of it.
    async fn framed_exchange(&self, command: &PlcCommand) -> PlcResult<Vec<String>> {
        let keyword = command.keyword();
        let mut slot = self.connection.lock().await;

        let first = self.exchange(&mut slot, command, true).await?;
        let mut lines = Vec::new();
        if !is_frame_marker(&first, keyword) {
            lines.push(first);
        }

        let line_timeout = self.options.list_line_timeout;
        loop {
            let Some(conn) = slot.as_mut() else {
                break;
            };
            let read = tokio::time::timeout(line_timeout, conn.read_line()).await;
            match read {
                Ok(Ok(line)) if is_frame_marker(&line, keyword) => {
                    conn.in_flight = false;
                    break;
                }
                Ok(Ok(line)) => lines.push(line),
                Ok(Err(err)) => {
                    error!(endpoint = %self.endpoint(), command = keyword, error = %err, "Reading framed reply failed");
                    self.drop_connection(&mut slot, "framed reply failed");
                    return Err(err);
                }
                Err(_) => {
                    StatsCounters::bump(&self.stats.timeouts);
                    warn!(
                        endpoint = %self.endpoint(),
                        command = keyword,
                        received = lines.len(),
                        "Timed out waiting for end of reply, returning truncated list"
                    );
                    self.drop_connection(&mut slot, "framed reply truncated");
                    break;
                }
            }
        }

        StatsCounters::bump(&self.stats.responses_received);
        Ok(lines)
    }
}

fn validate_name(name: &str) -> PlcResult<()> {
    if name.is_empty() || name.contains(['\r', '\n', FIELD_SEPARATOR]) {
        return Err(PlcError::protocol(format!("invalid variable name {:?}", name)));
    }
    Ok(())
}
