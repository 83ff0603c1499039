// MIT License - Copyright (c) 2026 Peter Wright

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{NetioError, Result};
use crate::transport::Transport;

struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// Scripted transport: each `send` must match the next expectation and
/// queues its response for `receive`.
pub(crate) struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending: VecDeque<u8>,
    chunk_size: Option<usize>,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
    close_calls: Arc<AtomicUsize>,
}

impl MockTransport {
    /// A connected transport that will first deliver `greeting`.
    pub(crate) fn with_greeting(greeting: &[u8]) -> Self {
        Self {
            expectations: VecDeque::new(),
            pending: greeting.iter().copied().collect(),
            chunk_size: None,
            connected: true,
            sent_log: Vec::new(),
            close_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Deliver replies at most `n` bytes per `receive`.
    pub(crate) fn set_chunk_size(&mut self, n: usize) {
        self.chunk_size = Some(n);
    }

    pub(crate) fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    pub(crate) fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    pub(crate) fn close_counter(&self) -> Arc<AtomicUsize> {
        self.close_calls.clone()
    }
}

impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(NetioError::Disconnected);
        }
        self.sent_log.push(data.to_vec());

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| NetioError::protocol("no more expectations in mock transport"))?;
        if data != expectation.request.as_slice() {
            return Err(NetioError::protocol(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }
        self.pending.extend(expectation.response);
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(NetioError::Disconnected);
        }
        if self.pending.is_empty() {
            return Err(NetioError::Timeout);
        }
        let limit = self.chunk_size.unwrap_or(usize::MAX).min(buf.len());
        let n = limit.min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
