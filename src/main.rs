// MIT License - Copyright (c) 2026 Peter Wright
// Command line control for NETIO 230A devices

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use netio_kshell::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_PORT};
use netio_kshell::{LoginMode, NetioClient, SessionConfig};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "netio-ctl")]
#[command(about = "Control a NETIO 230A power switch over KSHELL")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "netio.toml")]
    config: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Show all four outlets
    Status,
    /// Switch an outlet on (ports are numbered from 1)
    On { port: u32 },
    /// Switch an outlet off
    Off { port: u32 },
    /// Briefly cut power to an outlet
    Interrupt { port: u32 },
    /// Put an outlet into manual mode
    Manual { port: u32 },
    /// Firmware version
    Version,
    /// Show the device alias, or set it when a name is given
    Alias { name: Option<String> },
    /// Device clock and UTC offset
    Time,
    /// Reboot the device (outlet states are kept)
    Reboot,
    /// Send a raw KSHELL command and print the reply
    Raw {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    device: DeviceToml,
}

#[derive(Debug, Deserialize)]
struct DeviceToml {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_username")]
    username: String,
    #[serde(default = "default_password")]
    password: String,
    /// Use `clogin` with an MD5 token instead of a clear-text password.
    #[serde(default)]
    secure_login: bool,
    #[serde(default = "default_timeout")]
    timeout_ms: u64,
    #[serde(default = "default_buffer_size")]
    buffer_size: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_username() -> String {
    "admin".to_string()
}
fn default_password() -> String {
    "admin".to_string()
}
fn default_timeout() -> u64 {
    5000
}
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn build_session_config(toml: &DeviceToml) -> SessionConfig {
    SessionConfig::builder()
        .host(&toml.host)
        .port(toml.port)
        .username(&toml.username)
        .password(&toml.password)
        .login_mode(if toml.secure_login {
            LoginMode::Hashed
        } else {
            LoginMode::Cleartext
        })
        .timeout(Duration::from_millis(toml.timeout_ms))
        .buffer_size(toml.buffer_size)
        .build()
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=netio_kshell=debug). Default: warn,
    // so command output is not mixed with connection chatter.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // systemd journal already adds timestamps
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    let config_text =
        std::fs::read_to_string(&cli.config).context("Failed to read config file")?;
    let config: Config = toml::from_str(&config_text).context("Failed to parse config file")?;
    let session_config = build_session_config(&config.device);
    debug!("Using {:?}", session_config);

    let mut netio = NetioClient::connect(&session_config)
        .await
        .with_context(|| format!("Failed to connect to {}", session_config.addr()))?;

    let result = run(&mut netio, &cli).await;
    netio.disconnect().await.context("Failed to disconnect")?;
    result
}

async fn run(netio: &mut NetioClient, cli: &Cli) -> Result<()> {
    match &cli.command {
        Action::Status => {
            let outlets = netio.outlets().await.context("Failed to read outlets")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outlets)?);
            } else {
                for (i, outlet) in outlets.iter().enumerate() {
                    println!(
                        "{} {:<3} {:<16} {:<6} delay={}s restore={}",
                        i + 1,
                        if outlet.power_on { "on" } else { "off" },
                        outlet.name,
                        if outlet.manual_mode { "manual" } else { "timer" },
                        outlet.interrupt_delay,
                        u8::from(outlet.power_on_after_power_loss),
                    );
                }
            }
        }
        Action::On { port } => {
            netio.set_power(*port, true).await?;
            report(cli.json, json!({ "port": port, "power_on": true }), "OK");
        }
        Action::Off { port } => {
            netio.set_power(*port, false).await?;
            report(cli.json, json!({ "port": port, "power_on": false }), "OK");
        }
        Action::Interrupt { port } => {
            netio.set_interrupt(*port).await?;
            report(cli.json, json!({ "port": port, "interrupted": true }), "OK");
        }
        Action::Manual { port } => {
            netio.set_manual_mode(*port).await?;
            report(cli.json, json!({ "port": port, "manual_mode": true }), "OK");
        }
        Action::Version => {
            let version = netio.firmware_version().await?;
            report(cli.json, json!({ "version": version }), &version);
        }
        Action::Alias { name: Some(name) } => {
            netio.set_device_alias(name).await?;
            report(cli.json, json!({ "alias": name }), "OK");
        }
        Action::Alias { name: None } => {
            let alias = netio.device_alias().await?;
            report(cli.json, json!({ "alias": alias }), &alias);
        }
        Action::Time => {
            let time = netio.system_time().await?;
            let offset = netio.system_timezone().await?;
            report(
                cli.json,
                json!({ "time": time.to_string(), "utc_offset_hours": offset }),
                &format!("{} (UTC{:+})", time, offset),
            );
        }
        Action::Reboot => {
            netio.reboot().await?;
            info!("Reboot acknowledged");
            report(cli.json, json!({ "rebooting": true }), "Rebooting");
        }
        Action::Raw { command } => {
            let line = command.join(" ");
            let reply = netio.send_command(&line, false).await?;
            report(cli.json, json!({ "command": line, "reply": reply }), &reply);
        }
    }
    Ok(())
}

fn report(as_json: bool, value: serde_json::Value, text: &str) {
    if as_json {
        println!("{}", value);
    } else {
        println!("{}", text);
    }
}
