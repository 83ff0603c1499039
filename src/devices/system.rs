// MIT License - Copyright (c) 2026 Peter Wright

use std::net::Ipv4Addr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants::SYSTEM_TIME_FORMAT;
use crate::error::{NetioError, Result};

/// Addressing mode for `system eth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkConfig {
    Dhcp,
    Manual {
        address: Ipv4Addr,
        netmask: Ipv4Addr,
        gateway: Ipv4Addr,
    },
}

/// Seconds to the device's tenths-of-a-second unit, rounding up.
pub fn seconds_to_tenths(seconds: f64) -> Result<u32> {
    let tenths = (seconds * 10.0).ceil();
    if !tenths.is_finite() || tenths < 0.0 || tenths > f64::from(u32::MAX) {
        return Err(NetioError::parse(format!("switch delay out of range: {}", seconds)));
    }
    Ok(tenths as u32)
}

/// Parse a `system swdelay` payload (tenths of a second) into seconds.
pub fn parse_switch_delay(payload: &str) -> Result<f64> {
    let tenths: u32 = payload
        .trim()
        .parse()
        .map_err(|_| NetioError::parse(format!("invalid switch delay {:?}", payload)))?;
    Ok(f64::from(tenths) / 10.0)
}

/// Hours east of UTC to the device's seconds offset, rounding up.
pub fn hours_to_offset_seconds(hours: f64) -> Result<i64> {
    let seconds = (hours * 3600.0).ceil();
    if !seconds.is_finite() || seconds.abs() > 24.0 * 3600.0 {
        return Err(NetioError::parse(format!("timezone offset out of range: {}", hours)));
    }
    Ok(seconds as i64)
}

/// Parse a `system timezone` payload (seconds) into hours.
pub fn parse_timezone(payload: &str) -> Result<f64> {
    let seconds: i64 = payload
        .trim()
        .parse()
        .map_err(|_| NetioError::parse(format!("invalid timezone offset {:?}", payload)))?;
    Ok(seconds as f64 / 3600.0)
}

pub fn format_system_time(time: &NaiveDateTime) -> String {
    time.format(SYSTEM_TIME_FORMAT).to_string()
}

/// Parse `YYYY/MM/DD,HH:MM:SS` as reported by `system time`.
pub fn parse_system_time(payload: &str) -> Result<NaiveDateTime> {
    let invalid = || NetioError::parse(format!("invalid system time {:?}", payload));

    let (date, time) = payload.trim().split_once(',').ok_or_else(invalid)?;
    let date = parse_fields::<3>(date, '/').ok_or_else(invalid)?;
    let time = parse_fields::<3>(time, ':').ok_or_else(invalid)?;

    let year = i32::try_from(date[0]).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, date[1], date[2])
        .and_then(|d| d.and_hms_opt(time[0], time[1], time[2]))
        .ok_or_else(invalid)
}

fn parse_fields<const N: usize>(s: &str, sep: char) -> Option<[u32; N]> {
    let mut fields = [0u32; N];
    let mut parts = s.split(sep);
    for field in &mut fields {
        *field = parts.next()?.trim().parse().ok()?;
    }
    parts.next().is_none().then_some(fields)
}
