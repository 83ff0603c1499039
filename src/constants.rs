// MIT License - Copyright (c) 2026 Peter Wright

use std::time::Duration;

/// Line terminator used by the device for every reply.
pub const LINE_ENDING: &str = "\r\n";

/// Terminator appended to every request.
pub const COMMAND_TERMINATOR: u8 = b'\n';

/// Default KSHELL (telnet) port.
pub const DEFAULT_PORT: u16 = 23;

/// Connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Size of the receive buffer for one reply.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Number of switchable outlets on a NETIO 230A.
pub const OUTLET_COUNT: usize = 4;

/// Pause after the reboot acknowledgement before any further I/O.
pub const REBOOT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Prefix of the reboot acknowledgement.
pub const REBOOT_ACK_PREFIX: &str = "120 Rebooting";

/// Mode keyword reported by `port setup` for manually switched outlets.
pub const MANUAL_MODE_KEYWORD: &str = "manual";

/// Wire format of the device clock (`system time`).
pub const SYSTEM_TIME_FORMAT: &str = "%Y/%m/%d,%H:%M:%S";
