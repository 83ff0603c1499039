// MIT License - Copyright (c) 2026 Peter Wright

pub mod tcp;

#[cfg(test)]
pub(crate) mod mock;

use std::time::Duration;

use crate::error::Result;

pub use tcp::TcpTransport;

/// Connected byte stream to the device.
///
/// The session layer does all framing; a transport only moves bytes.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Write all of `data`.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout`.
    ///
    /// Returns [`NetioError::Timeout`](crate::error::NetioError::Timeout) when
    /// nothing arrives in time and
    /// [`NetioError::Disconnected`](crate::error::NetioError::Disconnected)
    /// when the peer has closed the connection.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
