// MIT License - Copyright (c) 2026 Peter Wright
//
// Toggle one outlet and print the outlet table before and after.
//
//   NETIO_HOST=192.168.1.2 NETIO_PASSWORD=admin cargo run --example switch_outlet -- 2

use anyhow::{Context, Result};
use netio_kshell::{NetioClient, SessionConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u32 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "1".to_string())
        .parse()
        .context("port must be a number from 1 to 4")?;
    let index = usize::try_from(port)?
        .checked_sub(1)
        .context("port must be a number from 1 to 4")?;

    let config = SessionConfig::builder()
        .host(std::env::var("NETIO_HOST").unwrap_or_else(|_| "192.168.1.2".into()))
        .username(std::env::var("NETIO_USER").unwrap_or_else(|_| "admin".into()))
        .password(std::env::var("NETIO_PASSWORD").unwrap_or_else(|_| "admin".into()))
        .secure_login(true)
        .build();

    let mut netio = NetioClient::connect(&config).await?;

    let before = netio.outlet(index).await?;
    println!("{} is {}", before.name, if before.power_on { "on" } else { "off" });

    netio.set_power(port, !before.power_on).await?;

    for outlet in netio.outlets().await? {
        println!("{:<16} {}", outlet.name, if outlet.power_on { "on" } else { "off" });
    }

    netio.disconnect().await?;
    Ok(())
}
