// src/net/mod.rs

//! Network helpers: port availability checks.

pub mod port_guard;

pub use port_guard::{check_port, ensure_free, ensure_ports_free, PortStatus};
