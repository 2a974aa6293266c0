//! Stream transports for the PLCComS client
//!
//! A transport only knows how to open a fresh byte stream to its endpoint.
//! Framing, locking and reconnect policy live in [`crate::client`], so tests
//! can substitute an in-memory stream without touching the protocol code.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

use crate::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use crate::error::{PlcError, PlcResult};

/// Opens byte streams to one PLC endpoint.
pub trait PlcTransport: Send + Sync {
    /// Stream type produced by [`PlcTransport::connect`]
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a new stream. Implementations bound the attempt themselves.
    fn connect(&self) -> impl Future<Output = PlcResult<Self::Stream>> + Send;

    /// `host:port` style label used in logs and errors.
    fn endpoint(&self) -> String;
}

/// TCP transport to a PLCComS server
#[derive(Debug, Clone)]
pub struct TcpTransport {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl PlcTransport for TcpTransport {
    type Stream = TcpStream;

    async fn connect(&self) -> PlcResult<TcpStream> {
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, "Connecting to PLCComS server");

        let attempt = TcpStream::connect((self.host.as_str(), self.port));
        let stream = match tokio::time::timeout(self.connect_timeout, attempt).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(PlcError::connection(format!(
                    "failed to connect to {}: {}",
                    endpoint, e
                )))
            }
            Err(_) => {
                return Err(PlcError::timeout(
                    format!("connect to {}", endpoint),
                    self.connect_timeout.as_millis() as u64,
                ))
            }
        };

        // Commands are tiny and latency-bound.
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_endpoint_label() {
        let transport = TcpTransport::new("192.168.1.10", 5010);
        assert_eq!(transport.endpoint(), "192.168.1.10:5010");
        assert_eq!(
            transport.connect_timeout(),
            Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS)
        );
    }

    #[tokio::test]
    async fn test_connect_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let transport = TcpTransport::new("127.0.0.1", port);
        let (stream, accepted) = tokio::join!(transport.connect(), listener.accept());
        assert!(stream.is_ok());
        assert!(accepted.is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let transport =
            TcpTransport::new("127.0.0.1", port).with_connect_timeout(Duration::from_secs(2));
        let err = transport.connect().await.unwrap_err();
        assert!(err.is_connection_loss());
    }
}
