// MIT License - Copyright (c) 2026 Peter Wright

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::constants::{COMMAND_TERMINATOR, LINE_ENDING};
use crate::devices::system::{NetworkConfig, format_system_time};
use crate::error::{NetioError, Result, StatusCode};

/// Commands understood by the KSHELL service.
///
/// # Connection Handshake
///
/// 1. Device sends `100 HELLO <nonce>[ - KSHELL V1.x]`
/// 2. Client sends `login <user> <pass>` or `clogin <user> <md5>`
/// 3. Device replies `250 OK`; any other reply means the login was rejected
///
/// # Outlet numbering
///
/// `port list` reports outlets positionally and `port setup` takes the
/// 1-based outlet number. The switching commands (`port <n> 0|1`,
/// `port <n> int`, `port <n> manual`) and `port wd <n>` are sent with the
/// number exactly as the caller passed it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `login <user> <pass>`: cleartext login.
    Login { username: String, password: String },
    /// `clogin <user> <token>`: hashed login, see [`crate::crypto::login_token`].
    HashedLogin { username: String, token: String },
    /// `port list`: aggregate on/off state, one `0`/`1` per outlet.
    PortList,
    /// `port setup <n>`: per-outlet setup line, `n` is 1-based.
    PortSetup { number: usize },
    /// `port <n> <0|1>`: switch an outlet off or on.
    SetPower { port: u32, on: bool },
    /// `port <n> int`: momentary interrupt.
    Interrupt { port: u32 },
    /// `port <n> manual`: switch an outlet to manual mode.
    ManualMode { port: u32 },
    /// `port wd <n>`: watchdog settings of an outlet.
    Watchdog { port: u32 },
    /// `version`: firmware version.
    Version,
    /// `alias`: device alias.
    Alias,
    /// `alias <name>`: rename the device.
    SetAlias { alias: String },
    /// `reboot`: answered with `120 Rebooting...` rather than 250.
    Reboot,
    /// `system eth`: network settings.
    NetworkSettings,
    /// `system eth dhcp` / `system eth manual <ip> <mask> <gw>`.
    SetNetworkSettings(NetworkConfig),
    /// `system dns`: DNS server.
    DnsServer,
    /// `system dns <server>`.
    SetDnsServer { server: Ipv4Addr },
    /// `system discover`: `enable` or `disable`.
    Discoverable,
    /// `system discover <enable|disable>`.
    SetDiscoverable { enabled: bool },
    /// `system swdelay`: switch delay in tenths of a second.
    SwitchDelay,
    /// `system swdelay <tenths>`.
    SetSwitchDelay { tenths: u32 },
    /// `system sntp`: SNTP settings.
    Sntp,
    /// `system sntp  <server>`: the enable keyword is not part of the line.
    SetSntp { server: String },
    /// `system time`: `YYYY/MM/DD,HH:MM:SS`.
    SystemTime,
    /// `system time <YYYY/MM/DD,HH:MM:SS>`.
    SetSystemTime { time: NaiveDateTime },
    /// `system timezone`: offset from UTC in seconds.
    Timezone,
    /// `system timezone <seconds>`.
    SetTimezone { seconds: i64 },
    /// Raw command string (for any unlisted commands).
    Raw(String),
}

impl Command {
    /// Convert the command to its wire string representation (without terminator).
    pub fn to_wire_string(&self) -> String {
        match self {
            Command::Login { username, password } => format!("login {} {}", username, password),
            Command::HashedLogin { username, token } => format!("clogin {} {}", username, token),
            Command::PortList => "port list".to_string(),
            Command::PortSetup { number } => format!("port setup {}", number),
            Command::SetPower { port, on } => format!("port {} {}", port, u8::from(*on)),
            Command::Interrupt { port } => format!("port {} int", port),
            Command::ManualMode { port } => format!("port {} manual", port),
            Command::Watchdog { port } => format!("port wd {}", port),
            Command::Version => "version".to_string(),
            Command::Alias => "alias".to_string(),
            Command::SetAlias { alias } => format!("alias {}", alias),
            Command::Reboot => "reboot".to_string(),
            Command::NetworkSettings => "system eth".to_string(),
            Command::SetNetworkSettings(NetworkConfig::Dhcp) => "system eth dhcp".to_string(),
            Command::SetNetworkSettings(NetworkConfig::Manual {
                address,
                netmask,
                gateway,
            }) => format!("system eth manual {} {} {}", address, netmask, gateway),
            Command::DnsServer => "system dns".to_string(),
            Command::SetDnsServer { server } => format!("system dns {}", server),
            Command::Discoverable => "system discover".to_string(),
            Command::SetDiscoverable { enabled } => {
                format!("system discover {}", if *enabled { "enable" } else { "disable" })
            }
            Command::SwitchDelay => "system swdelay".to_string(),
            Command::SetSwitchDelay { tenths } => format!("system swdelay {}", tenths),
            Command::Sntp => "system sntp".to_string(),
            Command::SetSntp { server } => format!("system sntp  {}", server),
            Command::SystemTime => "system time".to_string(),
            Command::SetSystemTime { time } => format!("system time {}", format_system_time(time)),
            Command::Timezone => "system timezone".to_string(),
            Command::SetTimezone { seconds } => format!("system timezone {}", seconds),
            Command::Raw(s) => s.clone(),
        }
    }

    /// Wire string safe for logs: credentials are masked.
    pub fn to_log_string(&self) -> String {
        match self {
            Command::Login { username, .. } => format!("login {} ****", username),
            Command::HashedLogin { username, .. } => format!("clogin {} ****", username),
            other => other.to_wire_string(),
        }
    }
}

/// Frame a request: validate the text and append the command terminator.
///
/// Requests must be printable ASCII on a single line.
pub fn encode_request(text: &str) -> Result<Vec<u8>> {
    if let Some(c) = text.chars().find(|c| !is_line_char(*c)) {
        return Err(NetioError::protocol(format!(
            "request contains invalid character {:?}",
            c
        )));
    }
    let mut frame = Vec::with_capacity(text.len() + 1);
    frame.extend_from_slice(text.as_bytes());
    frame.push(COMMAND_TERMINATOR);
    Ok(frame)
}

fn is_line_char(c: char) -> bool {
    c == '\t' || (' '..='~').contains(&c)
}

static RESPONSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{3})(?: (.*))?$").expect("valid response pattern"));

static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^100 HELLO ([0-9A-F]{8})(?: - KSHELL (V1\.[12]))?\r\n$")
        .expect("valid greeting pattern")
});

/// One decoded reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Three-digit status code.
    pub code: u16,
    /// Text after the code and its separating space.
    pub payload: String,
    /// The whole line without its terminator.
    pub line: String,
}

impl Response {
    /// Decode a raw reply. It must be exactly one `\r\n`-terminated line of
    /// printable ASCII starting with a 3-digit status code.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| NetioError::protocol("response is not ASCII"))?;
        let line = text.strip_suffix(LINE_ENDING).ok_or_else(|| {
            NetioError::protocol(format!("response not terminated by CRLF: {:?}", text))
        })?;
        if let Some(c) = line.chars().find(|c| !is_line_char(*c)) {
            return Err(NetioError::protocol(format!(
                "response contains invalid character {:?}: {:?}",
                c, line
            )));
        }
        let caps = RESPONSE_RE
            .captures(line)
            .ok_or_else(|| NetioError::protocol(format!("response has no status code: {:?}", line)))?;
        let code = caps[1]
            .parse()
            .map_err(|_| NetioError::protocol(format!("bad status code: {:?}", line)))?;
        let payload = caps.get(2).map_or("", |m| m.as_str()).to_string();
        Ok(Self {
            code,
            payload,
            line: line.to_string(),
        })
    }

    /// Whether the device accepted the command (250).
    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok.code()
    }

    /// The known meaning of the status code, if any.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_code(self.code)
    }
}

/// The `100 HELLO` banner sent right after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    /// Random 8-hex-digit value salting the hashed login.
    pub nonce: String,
    /// KSHELL version tag (`V1.1`, `V1.2`), absent on older firmware.
    pub version: Option<String>,
}

impl Greeting {
    /// Accepts `100 HELLO <nonce>\r\n` with an optional ` - KSHELL V1.1|V1.2` suffix.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(data);
        let caps = GREETING_RE.captures(&text).ok_or_else(|| NetioError::NoGreeting {
            greeting: text.trim_end().to_string(),
        })?;
        Ok(Self {
            nonce: caps[1].to_string(),
            version: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_command_wire_strings() {
        assert_eq!(Command::PortList.to_wire_string(), "port list");
        assert_eq!(Command::PortSetup { number: 1 }.to_wire_string(), "port setup 1");
        assert_eq!(Command::SetPower { port: 2, on: true }.to_wire_string(), "port 2 1");
        assert_eq!(Command::SetPower { port: 3, on: false }.to_wire_string(), "port 3 0");
        assert_eq!(Command::Interrupt { port: 1 }.to_wire_string(), "port 1 int");
        assert_eq!(Command::ManualMode { port: 4 }.to_wire_string(), "port 4 manual");
        assert_eq!(Command::Watchdog { port: 2 }.to_wire_string(), "port wd 2");
        assert_eq!(
            Command::SetAlias { alias: "rack-a".into() }.to_wire_string(),
            "alias rack-a"
        );
        assert_eq!(
            Command::SetDiscoverable { enabled: false }.to_wire_string(),
            "system discover disable"
        );
        assert_eq!(
            Command::SetSwitchDelay { tenths: 13 }.to_wire_string(),
            "system swdelay 13"
        );
        assert_eq!(
            Command::SetTimezone { seconds: -5400 }.to_wire_string(),
            "system timezone -5400"
        );
    }

    #[test]
    fn test_network_wire_strings() {
        assert_eq!(
            Command::SetNetworkSettings(NetworkConfig::Dhcp).to_wire_string(),
            "system eth dhcp"
        );
        let manual = NetworkConfig::Manual {
            address: Ipv4Addr::new(192, 168, 1, 2),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
        };
        assert_eq!(
            Command::SetNetworkSettings(manual).to_wire_string(),
            "system eth manual 192.168.1.2 255.255.255.0 192.168.1.1"
        );
        assert_eq!(
            Command::SetDnsServer { server: Ipv4Addr::new(8, 8, 8, 8) }.to_wire_string(),
            "system dns 8.8.8.8"
        );
    }

    #[test]
    fn test_set_time_wire_string() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(
            Command::SetSystemTime { time }.to_wire_string(),
            "system time 2024/03/07,09:05:00"
        );
    }

    #[test]
    fn test_login_masked_in_logs() {
        let cmd = Command::Login {
            username: "admin".into(),
            password: "hunter2".into(),
        };
        assert_eq!(cmd.to_wire_string(), "login admin hunter2");
        assert!(!cmd.to_log_string().contains("hunter2"));
        assert_eq!(Command::PortList.to_log_string(), "port list");
    }

    #[test]
    fn test_encode_request() {
        assert_eq!(encode_request("port list").unwrap(), b"port list\n");
        assert!(matches!(
            encode_request("port 1 1\nreboot"),
            Err(NetioError::Protocol { .. })
        ));
        assert!(encode_request("alias caf\u{e9}").is_err());
    }

    #[test]
    fn test_response_parse_ok() {
        let r = Response::parse(b"250 OK\r\n").unwrap();
        assert_eq!(r.code, 250);
        assert_eq!(r.payload, "OK");
        assert_eq!(r.line, "250 OK");
        assert!(r.is_ok());
        assert_eq!(r.status(), Some(StatusCode::Ok));
    }

    #[test]
    fn test_response_strips_only_leading_code() {
        let r = Response::parse(b"250 250 blocks\r\n").unwrap();
        assert_eq!(r.payload, "250 blocks");

        let r = Response::parse(b"250 \"Living Room\" manual 5 1\r\n").unwrap();
        assert_eq!(r.payload, "\"Living Room\" manual 5 1");
    }

    #[test]
    fn test_response_non_ok() {
        let r = Response::parse(b"120 Rebooting...\r\n").unwrap();
        assert_eq!(r.code, 120);
        assert!(!r.is_ok());
        assert_eq!(r.line, "120 Rebooting...");

        let r = Response::parse(b"502\r\n").unwrap();
        assert_eq!(r.code, 502);
        assert_eq!(r.payload, "");
    }

    #[test]
    fn test_response_grammar_violations() {
        for bad in [
            &b"250 OK"[..],
            b"250 OK\n",
            b"OK\r\n",
            b"25 OK\r\n",
            b"250OK\r\n",
            b"250 OK\r\n250 OK\r\n",
            b"250 \xff\r\n",
        ] {
            assert!(
                matches!(Response::parse(bad), Err(NetioError::Protocol { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_greeting_variants() {
        let g = Greeting::parse(b"100 HELLO E675DDA5\r\n").unwrap();
        assert_eq!(g.nonce, "E675DDA5");
        assert_eq!(g.version, None);

        let g = Greeting::parse(b"100 HELLO 0123ABCD - KSHELL V1.1\r\n").unwrap();
        assert_eq!(g.nonce, "0123ABCD");
        assert_eq!(g.version.as_deref(), Some("V1.1"));

        let g = Greeting::parse(b"100 HELLO 0123ABCD - KSHELL V1.2\r\n").unwrap();
        assert_eq!(g.version.as_deref(), Some("V1.2"));
    }

    #[test]
    fn test_greeting_rejected() {
        for bad in [
            &b"100 HELLO e675dda5\r\n"[..],
            b"100 HELLO E675DDA\r\n",
            b"100 HELLO E675DDA5",
            b"100 HELLO E675DDA5 - KSHELL V1.3\r\n",
            b"250 OK\r\n",
            b"",
        ] {
            assert!(
                matches!(Greeting::parse(bad), Err(NetioError::NoGreeting { .. })),
                "accepted {:?}",
                bad
            );
        }
    }
}
