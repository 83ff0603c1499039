// MIT License - Copyright (c) 2026 Peter Wright

use serde::Serialize;

use crate::constants::{MANUAL_MODE_KEYWORD, OUTLET_COUNT};
use crate::error::{NetioError, Result};

/// Cached state of one outlet.
///
/// A snapshot only: it changes when the client refreshes it from the
/// device or when the caller edits it, never on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outlet {
    pub name: String,
    /// `true` for manual switching, `false` for timer mode.
    pub manual_mode: bool,
    pub power_on: bool,
    pub power_on_after_power_loss: bool,
    /// Interrupt delay in seconds.
    pub interrupt_delay: u32,
    /// Never filled in from the device; `port setup` does not report it.
    pub watchdog_on: bool,
}

impl Default for Outlet {
    fn default() -> Self {
        Self {
            name: String::new(),
            manual_mode: true,
            power_on: false,
            power_on_after_power_loss: false,
            interrupt_delay: 2,
            watchdog_on: false,
        }
    }
}

impl Outlet {
    pub fn is_timer_mode(&self) -> bool {
        !self.manual_mode
    }

    pub fn set_timer_mode(&mut self, timer_mode: bool) {
        self.manual_mode = !timer_mode;
    }

    /// Overwrite the configuration fields with a parsed setup line and the
    /// power state from the port listing.
    pub fn apply(&mut self, setup: OutletSetup, power_on: bool) {
        self.name = setup.name;
        self.manual_mode = setup.manual_mode;
        self.interrupt_delay = setup.interrupt_delay;
        self.power_on_after_power_loss = setup.power_on_after_power_loss;
        self.power_on = power_on;
    }
}

/// Typed form of a `port setup` reply: `name mode delay restore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletSetup {
    pub name: String,
    pub manual_mode: bool,
    pub interrupt_delay: u32,
    pub power_on_after_power_loss: bool,
}

impl OutletSetup {
    /// Parse a setup payload such as `"Living Room" manual 5 1`.
    ///
    /// Tokens follow shell quoting, so names may contain spaces. Any mode
    /// keyword other than `manual` means timer mode. Trailing tokens beyond
    /// the fourth are ignored.
    pub fn parse(payload: &str) -> Result<Self> {
        let tokens = shlex::split(payload)
            .ok_or_else(|| NetioError::parse(format!("unbalanced quoting in port setup: {:?}", payload)))?;
        let [name, mode, delay, restore, ..] = tokens.as_slice() else {
            return Err(NetioError::parse(format!(
                "port setup needs 4 fields, got {}: {:?}",
                tokens.len(),
                payload
            )));
        };

        let interrupt_delay = delay
            .parse()
            .map_err(|_| NetioError::parse(format!("invalid interrupt delay {:?}", delay)))?;
        let power_on_after_power_loss = parse_flag(restore)
            .ok_or_else(|| NetioError::parse(format!("invalid power-restore flag {:?}", restore)))?;

        Ok(Self {
            name: name.clone(),
            manual_mode: mode == MANUAL_MODE_KEYWORD,
            interrupt_delay,
            power_on_after_power_loss,
        })
    }
}

/// Parse the `port list` payload into per-outlet power states.
///
/// e.g., "1001" → [true, false, false, true]
pub fn parse_port_list(payload: &str) -> Result<[bool; OUTLET_COUNT]> {
    let chars: Vec<char> = payload.chars().collect();
    if chars.len() != OUTLET_COUNT {
        return Err(NetioError::parse(format!(
            "port list must have {} entries: {:?}",
            OUTLET_COUNT, payload
        )));
    }
    let mut states = [false; OUTLET_COUNT];
    for (state, c) in states.iter_mut().zip(chars) {
        *state = match c {
            '0' => false,
            '1' => true,
            _ => {
                return Err(NetioError::parse(format!(
                    "invalid port state {:?} in {:?}",
                    c, payload
                )));
            }
        };
    }
    Ok(states)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
