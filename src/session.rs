// MIT License - Copyright (c) 2026 Peter Wright

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{LoginMode, SessionConfig};
use crate::constants::LINE_ENDING;
use crate::crypto::login_token;
use crate::error::{NetioError, Result};
use crate::protocol::{Command, Greeting, Response, encode_request};
use crate::transport::{TcpTransport, Transport};

/// An authenticated KSHELL session.
///
/// Owns the transport and runs strictly one request/response exchange at a
/// time; every method takes `&mut self`, so a second request cannot start
/// while one is awaiting its reply. Nothing is retried: timeouts and
/// protocol errors go straight back to the caller.
///
/// A reply longer than the receive buffer is not reassembled; it fails with
/// a protocol error and the session disconnects, since the rest of the line
/// is still unread on the connection.
pub struct Session<T: Transport = TcpTransport> {
    /// `None` once disconnected.
    transport: Option<T>,
    addr: String,
    greeting: Option<Greeting>,
    timeout: Duration,
    buffer_size: usize,
}

impl Session<TcpTransport> {
    /// Connect over TCP and log in.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let addr = config.addr();
        info!("Connecting to NETIO device at {}", addr);
        let transport = TcpTransport::connect_with_timeout(&addr, config.timeout).await?;
        Self::with_transport(transport, config).await
    }
}

impl<T: Transport> Session<T> {
    /// Run the handshake over an already connected transport.
    ///
    /// Sequence: read `100 HELLO` greeting → `login`/`clogin` → expect `250`.
    /// On failure the transport is closed before the error is returned.
    pub async fn with_transport(transport: T, config: &SessionConfig) -> Result<Self> {
        let mut session = Self {
            transport: Some(transport),
            addr: config.addr(),
            greeting: None,
            timeout: config.timeout,
            buffer_size: config.buffer_size.max(1),
        };

        match session.handshake(config).await {
            Ok(()) => Ok(session),
            Err(e) => {
                warn!("Handshake with {} failed: {}", session.addr, e);
                let _ = session.disconnect().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self, config: &SessionConfig) -> Result<()> {
        let mut data = Vec::new();
        if let Err(e) = self.read_line(&mut data).await {
            debug!("No greeting from {}: {}", self.addr, e);
            return Err(NetioError::NoGreeting {
                greeting: lossy_line(&data),
            });
        }
        let greeting = Greeting::parse(&data)?;
        debug!(
            "Greeting received (KSHELL {})",
            greeting.version.as_deref().unwrap_or("unversioned")
        );

        let login = match config.login_mode {
            LoginMode::Hashed => Command::HashedLogin {
                username: config.username.clone(),
                token: login_token(&config.username, &config.password, &greeting.nonce),
            },
            LoginMode::Cleartext => Command::Login {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        };
        self.greeting = Some(greeting);

        self.send_line(&login.to_wire_string(), &login.to_log_string())
            .await?;
        let read = self.read_line(&mut data).await;
        match read.and_then(|()| Response::parse(&data)) {
            Ok(response) if response.is_ok() => {}
            Ok(response) => {
                return Err(NetioError::LoginRejected {
                    response: response.line,
                });
            }
            // Anything but a status line is a refusal too.
            Err(NetioError::Protocol { .. }) => {
                return Err(NetioError::LoginRejected {
                    response: lossy_line(&data),
                });
            }
            Err(e) => return Err(e),
        }

        info!("Logged in to {} as {}", self.addr, config.username);
        Ok(())
    }

    /// Send a typed command, see [`send_command`](Self::send_command).
    pub async fn execute(&mut self, command: &Command, expect_ok: bool) -> Result<String> {
        self.request(&command.to_wire_string(), &command.to_log_string(), expect_ok)
            .await
    }

    /// Send one command line and return the reply payload.
    ///
    /// With `expect_ok`, any status other than 250 fails with
    /// [`NetioError::Command`]. Without it, a non-250 reply is returned as
    /// the raw line (e.g. `120 Rebooting...`).
    pub async fn send_command(&mut self, text: &str, expect_ok: bool) -> Result<String> {
        self.execute(&Command::Raw(text.to_string()), expect_ok).await
    }

    async fn request(&mut self, text: &str, log_text: &str, expect_ok: bool) -> Result<String> {
        let response = self.exchange(text, log_text).await?;
        if response.is_ok() {
            Ok(response.payload)
        } else if expect_ok {
            Err(NetioError::Command {
                request: log_text.to_string(),
                response: response.line,
            })
        } else {
            Ok(response.line)
        }
    }

    async fn exchange(&mut self, text: &str, log_text: &str) -> Result<Response> {
        self.send_line(text, log_text).await?;

        let mut data = Vec::new();
        self.read_line(&mut data).await?;
        let response = Response::parse(&data)?;
        debug!("Received response: {}", response.line);
        Ok(response)
    }

    async fn send_line(&mut self, text: &str, log_text: &str) -> Result<()> {
        let frame = encode_request(text)?;
        let transport = self.transport.as_mut().ok_or(NetioError::Disconnected)?;

        debug!("Sending command: {}", log_text);
        transport.send(&frame).await
    }

    /// Read into `data` until the line terminator arrives or the buffer is
    /// full. On error `data` holds whatever was received.
    ///
    /// An overflowing reply leaves its tail unread on the connection, so the
    /// session is disconnected rather than handing that tail to the next
    /// request.
    async fn read_line(&mut self, data: &mut Vec<u8>) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(NetioError::Disconnected)?;
        data.clear();
        data.resize(self.buffer_size, 0);
        let mut len = 0;

        let result = loop {
            match transport.receive(&mut data[len..], self.timeout).await {
                Ok(n) => len += n,
                Err(e) => break Err(e),
            }
            if data[..len].ends_with(LINE_ENDING.as_bytes()) {
                break Ok(());
            }
            if len == data.len() {
                break Err(NetioError::protocol(format!(
                    "reply exceeds {} byte receive buffer: {:?}",
                    self.buffer_size,
                    String::from_utf8_lossy(data)
                )));
            }
        };
        let overflowed = result.is_err() && len == data.len();
        data.truncate(len);

        if overflowed {
            warn!(
                "Reply exceeds the {} byte receive buffer, dropping connection to {}",
                self.buffer_size, self.addr
            );
            if let Err(e) = self.disconnect().await {
                warn!("Failed to close connection to {}: {}", self.addr, e);
            }
        }
        result
    }

    /// Close the connection. Safe to call more than once.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            info!("Disconnecting from {}", self.addr);
            transport.close().await?;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_connected())
    }

    /// The greeting received during the handshake.
    pub fn greeting(&self) -> Option<&Greeting> {
        self.greeting.as_ref()
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The underlying transport, while connected.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }
}

fn lossy_line(data: &[u8]) -> String {
    String::from_utf8_lossy(data).trim_end().to_string()
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        // Dropping the transport releases the socket; disconnect() already
        // took it if it ran, so the connection is only ever closed once.
        if self.transport.take().is_some() {
            debug!("Session to {} dropped while connected", self.addr);
        }
    }
}
