// MIT License - Copyright (c) 2026 Peter Wright
//
//! # netio-kshell
//!
//! Control NETIO 230A power distribution units over their KSHELL text
//! protocol (TCP port 23).
//!
//! A [`Session`] performs the greeting/login handshake and exchanges one
//! command line at a time. [`NetioClient`] builds on it with typed operations
//! for the four outlets and the device's system settings.
//!
//! ## Quick Start
//!
//! ```no_run
//! use netio_kshell::{NetioClient, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SessionConfig::builder()
//!         .host("192.168.1.2")
//!         .username("admin")
//!         .password("admin")
//!         .secure_login(true)
//!         .build();
//!
//!     let mut netio = NetioClient::connect(&config).await?;
//!     println!("firmware {}", netio.firmware_version().await?);
//!
//!     let outlet = netio.outlet(0).await?;
//!     netio.set_power(1, !outlet.power_on).await?;
//!
//!     netio.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod devices;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use client::NetioClient;
pub use config::{LoginMode, SessionConfig, SessionConfigBuilder};
pub use devices::outlet::{Outlet, OutletSetup};
pub use devices::system::NetworkConfig;
pub use error::{ErrorKind, NetioError, Result, StatusCode};
pub use protocol::{Command, Greeting, Response};
pub use session::Session;
pub use transport::{TcpTransport, Transport};
