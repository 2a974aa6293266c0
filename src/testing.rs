//! In-memory PLCComS server for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;

use crate::error::PlcResult;
use crate::transport::PlcTransport;

type Responder = Arc<dyn Fn(&str) -> Option<Vec<String>> + Send + Sync>;

/// Scripted fake server reached over `tokio::io::duplex`.
///
/// Each connect spawns a reader task that records every command the moment
/// it arrives and a writer task that answers in order, optionally after a
/// delay. A responder returning `None` leaves the command unanswered.
pub(crate) struct FakePlc {
    responder: Responder,
    delay: Duration,
    closing: HashSet<String>,
    events: Arc<Mutex<Vec<String>>>,
    connects: AtomicUsize,
}

impl FakePlc {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: Duration::ZERO,
            closing: HashSet::new(),
            events: Arc::new(Mutex::new(Vec::new())),
            connects: AtomicUsize::new(0),
        }
    }

    /// Delay every reply.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Close the stream when `command` arrives.
    pub(crate) fn closing_on(mut self, command: &str) -> Self {
        self.closing.insert(command.to_string());
        self
    }

    /// `recv <cmd>` / `sent <cmd>` events in the order they happened.
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Commands received, in arrival order.
    pub(crate) fn received(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix("recv ").map(str::to_string))
            .collect()
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl PlcTransport for FakePlc {
    type Stream = DuplexStream;

    async fn connect(&self) -> PlcResult<DuplexStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (read_half, mut write_half) = tokio::io::split(server);
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let events = self.events.clone();
        let closing = self.closing.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            while let Ok(Some(command)) = lines.next_line().await {
                events.lock().unwrap().push(format!("recv {}", command));
                if closing.contains(&command) || tx.send(command).is_err() {
                    break;
                }
            }
        });

        let events = self.events.clone();
        let responder = self.responder.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let Some(reply) = responder(&command) else {
                    continue;
                };
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                for line in reply {
                    if write_half.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                        return;
                    }
                }
                events.lock().unwrap().push(format!("sent {}", command));
            }
        });

        Ok(client)
    }

    fn endpoint(&self) -> String {
        "fake-plc:5010".to_string()
    }
}
