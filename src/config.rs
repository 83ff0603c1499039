// MIT License - Copyright (c) 2026 Peter Wright

use std::time::Duration;

use crate::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_PORT, DEFAULT_TIMEOUT};

/// How credentials are presented during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    /// `login <user> <pass>`: the password crosses the wire in clear text.
    #[default]
    Cleartext,
    /// `clogin <user> <md5>`: the password is hashed with the greeting nonce.
    /// Recommended on untrusted networks.
    Hashed,
}

/// Configuration for connecting to a NETIO device.
#[derive(Clone)]
pub struct SessionConfig {
    /// Hostname or IP address
    pub host: String,
    /// KSHELL port (default: 23)
    pub port: u16,
    pub username: String,
    pub password: String,
    pub login_mode: LoginMode,
    /// Connect and per-reply read timeout (default: 5s)
    pub timeout: Duration,
    /// Largest reply accepted, in bytes (default: 1024)
    pub buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.2".to_string(),
            port: DEFAULT_PORT,
            username: "admin".to_string(),
            password: "admin".to_string(),
            login_mode: LoginMode::Cleartext,
            timeout: DEFAULT_TIMEOUT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("login_mode", &self.login_mode)
            .field("timeout", &self.timeout)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl SessionConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// `host:port` string for connecting.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for SessionConfig.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn login_mode(mut self, mode: LoginMode) -> Self {
        self.config.login_mode = mode;
        self
    }

    /// `true` selects [`LoginMode::Hashed`], `false` [`LoginMode::Cleartext`].
    pub fn secure_login(self, secure: bool) -> Self {
        self.login_mode(if secure {
            LoginMode::Hashed
        } else {
            LoginMode::Cleartext
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::builder().build();
        assert_eq!(config.port, 23);
        assert_eq!(config.login_mode, LoginMode::Cleartext);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.buffer_size, 1024);
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::builder()
            .host("10.0.0.7")
            .port(1234)
            .username("ops")
            .password("pw")
            .secure_login(true)
            .build();

        assert_eq!(config.addr(), "10.0.0.7:1234");
        assert_eq!(config.username, "ops");
        assert_eq!(config.password, "pw");
        assert_eq!(config.login_mode, LoginMode::Hashed);

        let config = SessionConfig::builder().secure_login(false).build();
        assert_eq!(config.login_mode, LoginMode::Cleartext);
    }

    #[test]
    fn test_debug_hides_password() {
        let config = SessionConfig::builder().password("hunter2").build();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
