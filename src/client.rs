// MIT License - Copyright (c) 2026 Peter Wright

use std::net::Ipv4Addr;

use chrono::NaiveDateTime;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::constants::{OUTLET_COUNT, REBOOT_ACK_PREFIX, REBOOT_SETTLE_DELAY};
use crate::devices::outlet::{Outlet, OutletSetup, parse_port_list};
use crate::devices::system::{
    NetworkConfig, hours_to_offset_seconds, parse_switch_delay, parse_system_time,
    parse_timezone, seconds_to_tenths,
};
use crate::error::{NetioError, Result};
use crate::protocol::Command;
use crate::session::Session;
use crate::transport::{TcpTransport, Transport};

/// The main public API for a NETIO 230A.
///
/// # Example
///
/// ```no_run
/// use netio_kshell::{NetioClient, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = SessionConfig::builder()
///         .host("192.168.1.2")
///         .username("admin")
///         .password("admin")
///         .secure_login(true)
///         .build();
///
///     let mut netio = NetioClient::connect(&config).await?;
///     for (i, outlet) in netio.outlets().await?.iter().enumerate() {
///         println!("{}: {} on={}", i, outlet.name, outlet.power_on);
///     }
///     netio.set_power(1, true).await?;
///     netio.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct NetioClient<T: Transport = TcpTransport> {
    session: Session<T>,
    outlets: [Outlet; OUTLET_COUNT],
}

impl NetioClient<TcpTransport> {
    /// Connect over TCP and log in.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        Ok(Self::new(Session::connect(config).await?))
    }
}

impl<T: Transport> NetioClient<T> {
    /// Wrap an authenticated session.
    pub fn new(session: Session<T>) -> Self {
        Self {
            session,
            outlets: Default::default(),
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Send an arbitrary command line, see [`Session::send_command`].
    pub async fn send_command(&mut self, text: &str, expect_ok: bool) -> Result<String> {
        self.session.send_command(text, expect_ok).await
    }

    async fn query(&mut self, command: Command) -> Result<String> {
        self.session.execute(&command, true).await
    }

    // --- Outlets ---

    /// Raw `port list` payload, e.g. `"1001"`.
    pub async fn port_list(&mut self) -> Result<String> {
        self.query(Command::PortList).await
    }

    /// Raw `port setup` payload for a 0-based outlet index.
    pub async fn port_setup(&mut self, index: usize) -> Result<String> {
        check_index(index)?;
        self.query(Command::PortSetup { number: index + 1 }).await
    }

    /// Reload all outlet records from the device.
    ///
    /// Every reply is parsed before any record is touched, so on error the
    /// cached records keep their previous values.
    pub async fn refresh_outlets(&mut self) -> Result<()> {
        let power = parse_port_list(&self.port_list().await?)?;

        let mut setups = Vec::with_capacity(OUTLET_COUNT);
        for index in 0..OUTLET_COUNT {
            let payload = self.port_setup(index).await?;
            setups.push(OutletSetup::parse(&payload)?);
        }

        for ((outlet, setup), on) in self.outlets.iter_mut().zip(setups).zip(power) {
            outlet.apply(setup, on);
        }
        debug!("Outlet status refreshed");
        Ok(())
    }

    /// Refresh, then return a copy of one outlet (0-based).
    pub async fn outlet(&mut self, index: usize) -> Result<Outlet> {
        check_index(index)?;
        self.refresh_outlets().await?;
        Ok(self.outlets[index].clone())
    }

    /// Refresh, then return a copy of all outlets.
    pub async fn outlets(&mut self) -> Result<[Outlet; OUTLET_COUNT]> {
        self.refresh_outlets().await?;
        Ok(self.outlets.clone())
    }

    /// The records as of the last refresh, without talking to the device.
    pub fn cached_outlets(&self) -> &[Outlet; OUTLET_COUNT] {
        &self.outlets
    }

    /// Replace a cached record. The device is not changed.
    pub fn set_cached_outlet(&mut self, index: usize, outlet: Outlet) -> Result<()> {
        check_index(index)?;
        self.outlets[index] = outlet;
        Ok(())
    }

    /// `port <n> 0|1`. The number is sent exactly as given, in the device's
    /// own numbering, unlike [`port_setup`](Self::port_setup) which adds one.
    pub async fn set_power(&mut self, port: u32, on: bool) -> Result<()> {
        info!("Switching port {} {}", port, if on { "on" } else { "off" });
        self.query(Command::SetPower { port, on }).await?;
        Ok(())
    }

    /// `port <n> int`: momentary interrupt.
    pub async fn set_interrupt(&mut self, port: u32) -> Result<()> {
        info!("Interrupting port {}", port);
        self.query(Command::Interrupt { port }).await?;
        Ok(())
    }

    pub async fn set_manual_mode(&mut self, port: u32) -> Result<()> {
        self.query(Command::ManualMode { port }).await?;
        Ok(())
    }

    /// Raw `port wd <n>` payload.
    pub async fn watchdog_settings(&mut self, port: u32) -> Result<String> {
        self.query(Command::Watchdog { port }).await
    }

    // --- Device ---

    pub async fn firmware_version(&mut self) -> Result<String> {
        self.query(Command::Version).await
    }

    pub async fn device_alias(&mut self) -> Result<String> {
        self.query(Command::Alias).await
    }

    pub async fn set_device_alias(&mut self, alias: &str) -> Result<()> {
        self.query(Command::SetAlias {
            alias: alias.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Reboot the device. Outlet power states survive the reboot.
    ///
    /// The device answers `120 Rebooting...`; after that acknowledgement no
    /// request is sent for a short while because the device drops input
    /// during that window. Any other reply is accepted without the pause.
    pub async fn reboot(&mut self) -> Result<()> {
        let reply = self.session.execute(&Command::Reboot, false).await?;
        if reply.starts_with(REBOOT_ACK_PREFIX) {
            info!("Device at {} is rebooting", self.session.addr());
            sleep(REBOOT_SETTLE_DELAY).await;
        } else {
            warn!("Unexpected reply to reboot: {}", reply);
        }
        Ok(())
    }

    // --- System ---

    /// Raw `system eth` payload.
    pub async fn network_settings(&mut self) -> Result<String> {
        self.query(Command::NetworkSettings).await
    }

    pub async fn set_network_settings(&mut self, network: NetworkConfig) -> Result<()> {
        self.query(Command::SetNetworkSettings(network)).await?;
        Ok(())
    }

    pub async fn dns_server(&mut self) -> Result<String> {
        self.query(Command::DnsServer).await
    }

    pub async fn set_dns_server(&mut self, server: Ipv4Addr) -> Result<()> {
        self.query(Command::SetDnsServer { server }).await?;
        Ok(())
    }

    /// Whether the device answers the vendor's network discovery tool.
    pub async fn discoverable(&mut self) -> Result<bool> {
        Ok(self.query(Command::Discoverable).await? == "enable")
    }

    pub async fn set_discoverable(&mut self, enabled: bool) -> Result<()> {
        self.query(Command::SetDiscoverable { enabled }).await?;
        Ok(())
    }

    /// Switch delay in seconds (device stores tenths).
    pub async fn switch_delay(&mut self) -> Result<f64> {
        parse_switch_delay(&self.query(Command::SwitchDelay).await?)
    }

    /// Set the switch delay; rounded up to the next tenth of a second.
    pub async fn set_switch_delay(&mut self, seconds: f64) -> Result<()> {
        let tenths = seconds_to_tenths(seconds)?;
        self.query(Command::SetSwitchDelay { tenths }).await?;
        Ok(())
    }

    /// Raw `system sntp` payload.
    pub async fn sntp_settings(&mut self) -> Result<String> {
        self.query(Command::Sntp).await
    }

    /// Set the SNTP server.
    ///
    /// Only the server goes on the wire; `enable` is not transmitted, so
    /// SNTP cannot be switched on or off through this call.
    pub async fn set_sntp_settings(&mut self, enable: bool, server: &str) -> Result<()> {
        if !enable {
            warn!("SNTP enable flag is not transmitted; only the server is set");
        }
        self.query(Command::SetSntp {
            server: server.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn system_time(&mut self) -> Result<NaiveDateTime> {
        parse_system_time(&self.query(Command::SystemTime).await?)
    }

    pub async fn set_system_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.query(Command::SetSystemTime { time }).await?;
        Ok(())
    }

    /// Offset from UTC in hours.
    pub async fn system_timezone(&mut self) -> Result<f64> {
        parse_timezone(&self.query(Command::Timezone).await?)
    }

    /// Set the UTC offset in hours; rounded up to the next whole second.
    pub async fn set_system_timezone(&mut self, hours: f64) -> Result<()> {
        let seconds = hours_to_offset_seconds(hours)?;
        self.query(Command::SetTimezone { seconds }).await?;
        Ok(())
    }

    /// Close the connection. Safe to call more than once.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.session.disconnect().await
    }
}

fn check_index(index: usize) -> Result<()> {
    if index >= OUTLET_COUNT {
        return Err(NetioError::InvalidOutlet {
            index,
            count: OUTLET_COUNT,
        });
    }
    Ok(())
}
