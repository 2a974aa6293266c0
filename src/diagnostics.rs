//! PLC diagnostics assembled from `GETINFO:` and `EN:` replies.
//!
//! `GETINFO:` lines carry one key and one value, separated by the first `:`
//! or `,` after an optional `GETINFO:` prefix. `NETWORK` may repeat, once per
//! connected client. Lines that do not split are skipped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::parse_enabled_count;
use crate::constants::{
    CMD_GETINFO, DIAGNOSTIC_ACTIVE_VARIABLES, DIAGNOSTIC_CONNECTED_CLIENTS,
    DIAGNOSTIC_EPSNET_VERSION, DIAGNOSTIC_PLC_VERSION, DIAGNOSTIC_SERVER_VERSION,
};

/// One-shot PLC metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub plc_version: Option<String>,
    pub server_version: Option<String>,
    pub epsnet_version: Option<String>,
    pub connected_clients: Vec<String>,
    pub active_variables: Option<usize>,
    /// Other well-formed `GETINFO:` keys, upper-cased
    pub extra: BTreeMap<String, String>,
    pub retrieved_at: DateTime<Utc>,
}

enum InfoField {
    PlcVersion,
    ServerVersion,
    EpsnetVersion,
    Network,
    Other,
}

fn classify_key(key: &str) -> InfoField {
    match key {
        "VER_PLC" | "PLC_VERSION" => InfoField::PlcVersion,
        "VER_PLCCOMS" | "VER_SERVER" | "SERVER_VERSION" => InfoField::ServerVersion,
        "VER_EPSNET" | "EPSNET_VERSION" => InfoField::EpsnetVersion,
        "NETWORK" => InfoField::Network,
        _ => InfoField::Other,
    }
}

/// Split one `GETINFO:` line into an upper-cased key and a value.
pub fn parse_info_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let body = line.strip_prefix(CMD_GETINFO).unwrap_or(line);
    let (key, value) = body.split_once([':', ','])?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_uppercase(), value.trim().to_string()))
}

impl DiagnosticsSnapshot {
    /// Build a snapshot from raw `GETINFO:` lines and the raw `EN:` reply.
    pub fn from_replies<S: AsRef<str>>(info_lines: &[S], enabled_reply: Option<&str>) -> Self {
        let mut snapshot = DiagnosticsSnapshot {
            plc_version: None,
            server_version: None,
            epsnet_version: None,
            connected_clients: Vec::new(),
            active_variables: None,
            extra: BTreeMap::new(),
            retrieved_at: Utc::now(),
        };

        for line in info_lines {
            let line = line.as_ref();
            let Some((key, value)) = parse_info_line(line) else {
                debug!(line, "Skipping malformed GETINFO line");
                continue;
            };
            match classify_key(&key) {
                InfoField::PlcVersion => snapshot.plc_version = Some(value),
                InfoField::ServerVersion => snapshot.server_version = Some(value),
                InfoField::EpsnetVersion => snapshot.epsnet_version = Some(value),
                InfoField::Network => snapshot.connected_clients.push(value),
                InfoField::Other => {
                    snapshot.extra.insert(key, value);
                }
            }
        }

        if let Some(reply) = enabled_reply {
            match parse_enabled_count(reply) {
                Ok(count) => snapshot.active_variables = Some(count),
                Err(e) => warn!(reply, error = %e, "Unparsable EN reply"),
            }
        }

        snapshot
    }

    /// Flat key/value view using the diagnostic key names.
    pub fn as_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        if let Some(v) = &self.plc_version {
            map.insert(DIAGNOSTIC_PLC_VERSION, v.clone());
        }
        if let Some(v) = &self.server_version {
            map.insert(DIAGNOSTIC_SERVER_VERSION, v.clone());
        }
        if let Some(v) = &self.epsnet_version {
            map.insert(DIAGNOSTIC_EPSNET_VERSION, v.clone());
        }
        map.insert(DIAGNOSTIC_CONNECTED_CLIENTS, self.connected_clients.join(", "));
        if let Some(n) = self.active_variables {
            map.insert(DIAGNOSTIC_ACTIVE_VARIABLES, n.to_string());
        }
        map
    }
}
