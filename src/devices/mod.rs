// MIT License - Copyright (c) 2026 Peter Wright

pub mod outlet;
pub mod system;

pub use outlet::{Outlet, OutletSetup, parse_port_list};
pub use system::NetworkConfig;
