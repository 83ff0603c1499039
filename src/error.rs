// MIT License - Copyright (c) 2026 Peter Wright

use std::fmt;

/// Numeric reply codes sent by the KSHELL service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 100 - Greeting banner
    Hello,
    /// 110 - Session closed
    Bye,
    /// 120 - Reboot acknowledged
    Rebooting,
    /// 130 - Idle connection timeout
    ConnectionTimeout,
    /// 250 - Command accepted
    Ok,
    /// 500 - Invalid value
    InvalidValue,
    /// 501 - Invalid parameter
    InvalidParameter,
    /// 502 - Unknown command
    UnknownCommand,
    /// 503 - Invalid login
    InvalidLogin,
    /// 504 - Already logged in
    AlreadyLoggedIn,
    /// 505 - Forbidden
    Forbidden,
    /// 506 - Input line too long
    InputLineTooLong,
    /// 507 - Too many connections
    TooManyConnections,
}

impl StatusCode {
    /// Look up a numeric reply code (e.g., 250, 503).
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            100 => Some(Self::Hello),
            110 => Some(Self::Bye),
            120 => Some(Self::Rebooting),
            130 => Some(Self::ConnectionTimeout),
            250 => Some(Self::Ok),
            500 => Some(Self::InvalidValue),
            501 => Some(Self::InvalidParameter),
            502 => Some(Self::UnknownCommand),
            503 => Some(Self::InvalidLogin),
            504 => Some(Self::AlreadyLoggedIn),
            505 => Some(Self::Forbidden),
            506 => Some(Self::InputLineTooLong),
            507 => Some(Self::TooManyConnections),
            _ => None,
        }
    }

    /// The numeric wire value.
    pub fn code(&self) -> u16 {
        match self {
            Self::Hello => 100,
            Self::Bye => 110,
            Self::Rebooting => 120,
            Self::ConnectionTimeout => 130,
            Self::Ok => 250,
            Self::InvalidValue => 500,
            Self::InvalidParameter => 501,
            Self::UnknownCommand => 502,
            Self::InvalidLogin => 503,
            Self::AlreadyLoggedIn => 504,
            Self::Forbidden => 505,
            Self::InputLineTooLong => 506,
            Self::TooManyConnections => 507,
        }
    }

    /// Human-readable description of the reply code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Hello => "Hello",
            Self::Bye => "Bye",
            Self::Rebooting => "Rebooting",
            Self::ConnectionTimeout => "Connection timeout",
            Self::Ok => "OK",
            Self::InvalidValue => "Invalid value",
            Self::InvalidParameter => "Invalid parameter",
            Self::UnknownCommand => "Unknown command",
            Self::InvalidLogin => "Invalid login",
            Self::AlreadyLoggedIn => "Already logged in",
            Self::Forbidden => "Forbidden",
            Self::InputLineTooLong => "Input line too long",
            Self::TooManyConnections => "Too many connections",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Coarse category of a [`NetioError`], for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The TCP connection could not be established.
    Connect,
    /// Greeting or login failed.
    Handshake,
    /// The device rejected a command.
    Command,
    /// A payload could not be turned into typed values.
    Parse,
    /// An outlet index outside the device's range.
    Index,
    /// The byte stream failed, timed out or was closed.
    Transport,
    /// A response violated the line grammar.
    Protocol,
}

/// All errors that can occur while talking to a NETIO device.
#[derive(Debug, thiserror::Error)]
pub enum NetioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection to {addr} refused")]
    ConnectionRefused { addr: String },

    #[error("Timeout while connecting to {addr}")]
    ConnectTimeout { addr: String },

    #[error("No HELLO greeting received, got: {greeting:?}")]
    NoGreeting { greeting: String },

    #[error("Login rejected: {response}")]
    LoginRejected { response: String },

    #[error("Command {request:?} failed, device replied: {response}")]
    Command { request: String, response: String },

    #[error("Parse error: {details}")]
    Parse { details: String },

    #[error("Invalid outlet index: {index} (outlets: {count})")]
    InvalidOutlet { index: usize, count: usize },

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("Connection closed")]
    Disconnected,

    #[error("Protocol error: {details}")]
    Protocol { details: String },
}

impl NetioError {
    pub(crate) fn parse(details: impl Into<String>) -> Self {
        Self::Parse {
            details: details.into(),
        }
    }

    pub(crate) fn protocol(details: impl Into<String>) -> Self {
        Self::Protocol {
            details: details.into(),
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionRefused { .. } | Self::ConnectTimeout { .. } => ErrorKind::Connect,
            Self::NoGreeting { .. } | Self::LoginRejected { .. } => ErrorKind::Handshake,
            Self::Command { .. } => ErrorKind::Command,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::InvalidOutlet { .. } => ErrorKind::Index,
            Self::Io(_) | Self::Timeout | Self::Disconnected => ErrorKind::Transport,
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// Whether reconnecting and retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connect | ErrorKind::Transport)
    }

    /// The KSHELL reply code carried by a command or login failure, if known.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Command { response, .. } | Self::LoginRejected { response } => response
                .get(..3)
                .and_then(|c| c.parse().ok())
                .and_then(StatusCode::from_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetioError>;
