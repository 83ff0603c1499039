// MIT License - Copyright (c) 2026 Peter Wright

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

use crate::constants::DEFAULT_TIMEOUT;
use crate::error::{NetioError, Result};
use crate::transport::Transport;

/// Plain TCP connection to the KSHELL port.
#[derive(Debug)]
pub struct TcpTransport {
    /// `None` once closed.
    stream: Option<TcpStream>,
    addr: String,
}

impl TcpTransport {
    /// Connect to a `host:port` address with the default 5 second timeout.
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_timeout(addr, DEFAULT_TIMEOUT).await
    }

    /// Connect to a `host:port` address, giving up after `timeout`.
    pub async fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        debug!(addr = %addr, timeout_ms = timeout.as_millis(), "Connecting to device");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                error!(addr = %addr, "TCP connection timed out");
                NetioError::ConnectTimeout {
                    addr: addr.to_string(),
                }
            })?
            .map_err(|e| {
                error!(addr = %addr, error = %e, "TCP connection failed");
                map_connect_error(e, addr)
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!(addr = %addr, error = %e, "Failed to set TCP_NODELAY");
        }

        info!(addr = %addr, "TCP connection established");
        Ok(Self::from_stream(stream, addr.to_string()))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, addr: String) -> Self {
        Self {
            stream: Some(stream),
            addr,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Transport for TcpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(NetioError::Disconnected)?;
        trace!(addr = %self.addr, bytes = data.len(), "Sending data");

        stream.write_all(data).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "Failed to send data");
            map_io_error(e)
        })?;
        stream.flush().await.map_err(map_io_error)?;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(NetioError::Disconnected)?;

        match tokio::time::timeout(timeout, stream.read(buf)).await {
            Ok(Ok(0)) => {
                warn!(addr = %self.addr, "Peer closed connection");
                Err(NetioError::Disconnected)
            }
            Ok(Ok(n)) => {
                trace!(addr = %self.addr, bytes = n, "Received data");
                Ok(n)
            }
            Ok(Err(e)) => {
                error!(addr = %self.addr, error = %e, "Failed to receive data");
                Err(map_io_error(e))
            }
            Err(_) => {
                debug!(addr = %self.addr, timeout_ms = timeout.as_millis(), "Timeout waiting for data");
                Err(NetioError::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!(addr = %self.addr, error = %e, "Failed to shut down TCP stream");
            }
            info!(addr = %self.addr, "TCP connection closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

fn map_connect_error(e: std::io::Error, addr: &str) -> NetioError {
    match e.kind() {
        std::io::ErrorKind::ConnectionRefused => NetioError::ConnectionRefused {
            addr: addr.to_string(),
        },
        std::io::ErrorKind::TimedOut => NetioError::ConnectTimeout {
            addr: addr.to_string(),
        },
        _ => NetioError::Io(e),
    }
}

fn map_io_error(e: std::io::Error) -> NetioError {
    match e.kind() {
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::ConnectionAborted => NetioError::Disconnected,
        _ => NetioError::Io(e),
    }
}
