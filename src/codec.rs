//! # PLCComS Line Codec
//!
//! Command encoding, incremental line framing over a byte buffer, and parsing
//! of the single-line replies (`GET:`, `LIST:` entries, `EN:`).
//!
//! ## Line framing
//!
//! Replies are `\n` terminated; a preceding `\r` is tolerated. Bytes that are
//! not valid UTF-8 are decoded lossily, the PLC may publish names in a legacy
//! code page.

use std::fmt;

use bytes::{Buf, BytesMut};

use crate::constants::{
    CMD_ENABLED_COUNT, CMD_GET, CMD_GETINFO, CMD_LIST, CMD_SET, FIELD_SEPARATOR, LINE_TERMINATOR,
    MAX_LINE_LENGTH,
};
use crate::error::{PlcError, PlcResult};

/// A PLCComS command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlcCommand {
    /// `LIST:`
    List,
    /// `GET:<name>`
    Get(String),
    /// `SET:<name>,<value>`
    Set { name: String, value: String },
    /// `GETINFO:`
    GetInfo,
    /// `EN:`
    EnabledCount,
    /// Any other command line, sent verbatim
    Other(String),
}

impl PlcCommand {
    /// Parse a command line, mapping known keywords to their variant.
    pub fn raw(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            CMD_LIST => return PlcCommand::List,
            CMD_GETINFO => return PlcCommand::GetInfo,
            CMD_ENABLED_COUNT => return PlcCommand::EnabledCount,
            _ => {}
        }
        if let Some(name) = line.strip_prefix(CMD_GET) {
            return PlcCommand::Get(name.to_string());
        }
        if let Some((name, value)) = line
            .strip_prefix(CMD_SET)
            .and_then(|rest| rest.split_once(FIELD_SEPARATOR))
        {
            return PlcCommand::Set {
                name: name.to_string(),
                value: value.to_string(),
            };
        }
        PlcCommand::Other(line.to_string())
    }

    /// Keyword that opens (and for framed replies, closes) the exchange.
    pub fn keyword(&self) -> &str {
        match self {
            PlcCommand::List => CMD_LIST,
            PlcCommand::Get(_) => CMD_GET,
            PlcCommand::Set { .. } => CMD_SET,
            PlcCommand::GetInfo => CMD_GETINFO,
            PlcCommand::EnabledCount => CMD_ENABLED_COUNT,
            PlcCommand::Other(line) => match line.find(':') {
                Some(pos) => &line[..=pos],
                None => line,
            },
        }
    }

    /// Encode as a wire line including the terminator.
    pub fn encode(&self) -> String {
        let mut line = self.to_string();
        line.push_str(LINE_TERMINATOR);
        line
    }
}

impl fmt::Display for PlcCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlcCommand::Get(name) => write!(f, "{}{}", CMD_GET, name),
            PlcCommand::Set { name, value } => {
                write!(f, "{}{}{}{}", CMD_SET, name, FIELD_SEPARATOR, value)
            }
            PlcCommand::Other(line) => f.write_str(line),
            other => f.write_str(other.keyword()),
        }
    }
}

/// Accumulates stream bytes and yields complete lines.
///
/// Partial lines stay buffered across reads, so a read that is cancelled by
/// a timeout never loses bytes that already arrived.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Mutable access for `read_buf`.
    pub fn bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Pop the next complete line without its terminator.
    ///
    /// Returns `Ok(None)` when no terminator is buffered yet, and a protocol
    /// error if the pending line grew beyond [`MAX_LINE_LENGTH`].
    pub fn next_line(&mut self) -> PlcResult<Option<String>> {
        match self.buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let raw = self.buf.split_to(pos + 1);
                let mut line = &raw[..pos];
                if let [head @ .., b'\r'] = line {
                    line = head;
                }
                Ok(Some(String::from_utf8_lossy(line).into_owned()))
            }
            None if self.buf.len() > MAX_LINE_LENGTH => {
                let pending = self.buf.len();
                self.buf.advance(pending);
                Err(PlcError::protocol(format!(
                    "response line exceeds {} bytes",
                    MAX_LINE_LENGTH
                )))
            }
            None => Ok(None),
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Extract the variable name from one `LIST:` data line.
///
/// Lines look like `NAME,TYPE[,...]`, optionally prefixed with `LIST:`.
/// Blank lines yield `None`.
pub fn parse_list_line(line: &str) -> Option<String> {
    let line = line.trim();
    let line = line.strip_prefix(CMD_LIST).unwrap_or(line).trim();
    let name = line.split(FIELD_SEPARATOR).next().unwrap_or_default().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Split a `GET:` reply `<name>,<value>` at the first comma.
pub fn parse_get_response(response: &str) -> PlcResult<(&str, &str)> {
    response
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| PlcError::protocol(format!("expected `<name>,<value>`, got {:?}", response)))
}

/// Parse the `EN:` reply, the count follows the last colon.
pub fn parse_enabled_count(response: &str) -> PlcResult<usize> {
    let tail = response
        .rsplit_once(':')
        .map(|(_, tail)| tail)
        .unwrap_or(response)
        .trim();
    tail.parse::<usize>()
        .map_err(|e| PlcError::protocol(format!("invalid variable count {:?}: {}", response, e)))
}

/// Whether `line` is the bare echo of `keyword` that frames a multi-line reply.
#[inline]
pub fn is_frame_marker(line: &str, keyword: &str) -> bool {
    line.trim() == keyword
}
